/// Width of one expanded tab, in spaces.
const TAB_WIDTH: usize = 2;

/// One open document: the text buffer plus the caret driving it.
///
/// Keystroke handling routes every character through the buffer's edit
/// protocol one at a time, the way the input loop delivers them; the buffer
/// keeps its store and line index consistent underneath.
#[derive(Debug, Default)]
pub struct Document {
    pub text: editor_core::text::TextBuffer,
    pub cursor: editor_core::cursor::Cursor,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a file and bulk-loads the buffer from its bytes, caret at the
    /// origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> editor_core::errors::EditResult<Self> {
        Ok(Self {
            text: editor_core::text::TextBuffer::open(path)?,
            cursor: editor_core::cursor::Cursor::default(),
        })
    }
}

/*

====================
===== EDITING ======
====================

*/

impl Document {
    /// Types one character at the caret and advances it.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the caret points outside the document.
    pub fn insert_char(&mut self, code: u32) -> editor_core::errors::EditResult<()> {
        let index = self
            .cursor
            .index(&self.text)
            .ok_or(editor_core::errors::EditError::OutOfRange(u64::from(
                self.cursor.row,
            )))?;

        self.text.insert_char(index, code)?;
        self.cursor.move_right(&self.text);

        Ok(())
    }

    /// Types a string character by character, exactly as the text-event
    /// path would deliver it.
    ///
    /// # Errors
    ///
    /// Propagates the first failed character insert.
    pub fn insert_str(&mut self, text: &str) -> editor_core::errors::EditResult<()> {
        for ch in text.chars() {
            self.insert_char(ch as u32)?;
        }
        Ok(())
    }

    /// Expands a tab to spaces in one edit; the run insert moves every later
    /// line with a single width-sized shift.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the caret points outside the document.
    pub fn insert_tab(&mut self) -> editor_core::errors::EditResult<()> {
        let index = self
            .cursor
            .index(&self.text)
            .ok_or(editor_core::errors::EditError::OutOfRange(u64::from(
                self.cursor.row,
            )))?;

        self.text
            .insert_run(index, &[u32::from(b' '); TAB_WIDTH])?;
        for _ in 0..TAB_WIDTH {
            self.cursor.move_right(&self.text);
        }

        Ok(())
    }

    /// Deletes the character behind the caret; at the document origin this
    /// is a no-op reported as `false`.
    ///
    /// # Errors
    ///
    /// Propagates a buffer delete failure; the caret has already moved in
    /// that case only if the underlying structures were out of sync.
    pub fn backspace(&mut self) -> editor_core::errors::EditResult<bool> {
        if !self.cursor.move_left(&self.text) {
            return Ok(false);
        }

        let index = self
            .cursor
            .index(&self.text)
            .ok_or(editor_core::errors::EditError::OutOfRange(u64::from(
                self.cursor.row,
            )))?;

        self.text.delete_char(index)?;
        Ok(true)
    }

    /// Deletes the character under the caret; at the document end this is a
    /// no-op reported as `false`.
    ///
    /// # Errors
    ///
    /// Propagates a buffer delete failure.
    pub fn delete_forward(&mut self) -> editor_core::errors::EditResult<bool> {
        let Some(index) = self.cursor.index(&self.text) else {
            return Ok(false);
        };
        if index >= self.text.size() {
            return Ok(false);
        }

        self.text.delete_char(index)?;
        Ok(true)
    }
}

/*

====================
===== QUERIES ======
====================

*/

impl Document {
    /// Line text for a rendering collaborator.
    #[must_use]
    pub fn line_text(&self, line: u32) -> Option<String> {
        self.text.line_string(line)
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.text.line_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_advances_the_caret() {
        let mut doc = Document::new();

        doc.insert_str("hi\n").unwrap();

        assert_eq!((doc.cursor.row, doc.cursor.col), (1, 0));
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(0).as_deref(), Some("hi"));
    }

    #[test]
    fn test_typing_mid_document_splits_the_line() {
        let mut doc = Document::new();
        doc.insert_str("abcd").unwrap();

        doc.cursor = editor_core::cursor::Cursor::new(0, 2);
        doc.insert_char(u32::from(b'\n')).unwrap();

        assert_eq!(doc.line_text(0).as_deref(), Some("ab"));
        assert_eq!(doc.line_text(1).as_deref(), Some("cd"));
        assert_eq!((doc.cursor.row, doc.cursor.col), (1, 0));
    }

    #[test]
    fn test_backspace_at_origin_does_nothing() {
        let mut doc = Document::new();
        doc.insert_str("x").unwrap();
        doc.cursor = editor_core::cursor::Cursor::new(0, 0);

        assert!(!doc.backspace().unwrap());
        assert_eq!(doc.line_text(0).as_deref(), Some("x"));
    }

    #[test]
    fn test_backspace_across_the_boundary_joins_lines() {
        let mut doc = Document::new();
        doc.insert_str("ab\ncd").unwrap();
        doc.cursor = editor_core::cursor::Cursor::new(1, 0);

        assert!(doc.backspace().unwrap());

        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line_text(0).as_deref(), Some("abcd"));
        assert_eq!((doc.cursor.row, doc.cursor.col), (0, 2));
    }

    #[test]
    fn test_delete_forward_takes_the_break() {
        let mut doc = Document::new();
        doc.insert_str("ab\ncd").unwrap();
        doc.cursor = editor_core::cursor::Cursor::new(0, 2);

        assert!(doc.delete_forward().unwrap());

        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line_text(0).as_deref(), Some("abcd"));
    }

    #[test]
    fn test_delete_forward_at_document_end_does_nothing() {
        let mut doc = Document::new();
        doc.insert_str("ab").unwrap();

        assert!(!doc.delete_forward().unwrap());
        assert_eq!(doc.line_text(0).as_deref(), Some("ab"));
    }

    #[test]
    fn test_tab_expands_to_spaces_in_one_shift() {
        let mut doc = Document::new();
        doc.insert_str("ab\ncd").unwrap();
        doc.cursor = editor_core::cursor::Cursor::new(0, 1);

        doc.insert_tab().unwrap();

        assert_eq!(doc.line_text(0).as_deref(), Some("a  b"));
        assert_eq!(doc.line_text(1).as_deref(), Some("cd"));
        assert_eq!((doc.cursor.row, doc.cursor.col), (0, 3));
    }

    #[test]
    fn test_open_positions_the_caret_at_the_origin() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first\nsecond\n").unwrap();
        file.as_file().sync_all().unwrap();

        let doc = Document::open(file.path()).expect("open should succeed");

        assert_eq!((doc.cursor.row, doc.cursor.col), (0, 0));
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(1).as_deref(), Some("second"));
    }

    #[test]
    fn test_editing_a_loaded_document() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"one\ntwo").unwrap();
        file.as_file().sync_all().unwrap();

        let mut doc = Document::open(file.path()).unwrap();
        doc.cursor = editor_core::cursor::Cursor::new(1, 0);
        doc.insert_str("2 aka ").unwrap();

        assert_eq!(doc.line_text(0).as_deref(), Some("one"));
        assert_eq!(doc.line_text(1).as_deref(), Some("2 aka two"));
    }
}
