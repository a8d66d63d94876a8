/// The character code every line-index node corresponds to.
pub const LINE_BREAK: u32 = '\n' as u32;

/// Owns the character store and the line index and keeps them consistent.
///
/// Every edit mutates the store first and then informs the index: a break
/// edit as a structural `insert`/`delete`, any other character as an
/// O(log n) `shift`. Offsets handed to the index always name the edit
/// position itself — for a removal, the position the character occupied
/// before it went away.
#[derive(Debug, Default)]
pub struct TextBuffer {
    store: crate::text_store::TextStore,
    lines: crate::line_index::tree::LineTree,
}

/*

==============================
===== CREATION & LOADING =====
==============================

*/

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: crate::text_store::TextStore::new(),
            lines: crate::line_index::tree::LineTree::new(),
        }
    }

    /// Builds the store and a balanced line index from raw bytes in one
    /// scan each.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            store: crate::text_store::TextStore::from_bytes(bytes),
            lines: crate::line_index::tree::LineTree::from_text(bytes),
        }
    }

    /// Opens a file through the memory-mapped loader and bulk-loads both
    /// structures from its bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> crate::errors::EditResult<Self> {
        let mmap = io::mmap::MmapFile::open(path)?;
        Ok(Self::from_bytes(mmap.as_slice()))
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl TextBuffer {
    /// Current character count of the store.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.store.size()
    }

    /// Total number of lines; one more than the tracked breaks, so a buffer
    /// always has at least one line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.lines.len() + 1
    }

    /// Read access to the raw store, for collaborators that slice it.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &crate::text_store::TextStore {
        &self.store
    }

    /// Read access to the line index, for traversal by break handles.
    #[inline]
    #[must_use]
    pub fn line_index(&self) -> &crate::line_index::tree::LineTree {
        &self.lines
    }
}

/*

============================
===== EDIT COORDINATION =====
============================

*/

impl TextBuffer {
    /// Inserts one character code at `index`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `index` is past the end of the store; neither
    /// structure is modified in that case.
    pub fn insert_char(&mut self, index: u64, code: u32) -> crate::errors::EditResult<()> {
        if !self.store.insert(index, code) {
            return Err(crate::errors::EditError::OutOfRange(index));
        }

        if code == LINE_BREAK {
            self.lines.insert(index);
        } else {
            self.lines
                .shift(index, 1, crate::enums::ShiftDirection::Forward);
        }

        Ok(())
    }

    /// Removes the character at `index` and returns its code.
    ///
    /// The code is read before the store mutates so the break / plain
    /// dispatch never inspects a shifted tail.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `index` names no character. `NotFound` can only
    /// surface if the store and the index disagree about a break, which
    /// means the edit protocol was bypassed somewhere.
    pub fn delete_char(&mut self, index: u64) -> crate::errors::EditResult<u32> {
        let code = self
            .store
            .get(index)
            .ok_or(crate::errors::EditError::OutOfRange(index))?;

        self.store.delete(index);

        if code == LINE_BREAK {
            if !self.lines.delete(index) {
                return Err(crate::errors::EditError::NotFound(index));
            }
        } else {
            self.lines
                .shift(index, 1, crate::enums::ShiftDirection::Backward);
        }

        Ok(code)
    }

    /// Inserts a run of plain (non-break) codes with a single index shift.
    ///
    /// Several characters land at once and every later break moves by the
    /// run length in one O(log n) update — the tab-expansion path.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `index` is past the end of the store.
    pub fn insert_run(&mut self, index: u64, codes: &[u32]) -> crate::errors::EditResult<()> {
        debug_assert!(
            codes.iter().all(|&code| code != LINE_BREAK),
            "break characters must go through insert_char"
        );

        if index > self.store.size() {
            return Err(crate::errors::EditError::OutOfRange(index));
        }

        for (position, &code) in codes.iter().enumerate() {
            self.store.insert(index + position as u64, code);
        }
        self.lines.shift(
            index,
            codes.len() as u64,
            crate::enums::ShiftDirection::Forward,
        );

        Ok(())
    }
}

/*

========================
===== LINE QUERIES =====
========================

*/

impl TextBuffer {
    /// Start offset and length of `line`, its terminating break excluded.
    #[must_use]
    pub fn line(&self, line: u32) -> Option<(u64, u64)> {
        self.lines.line_at(line, self.store.size())
    }

    /// The line's codes, sliced straight out of the store — the narrow
    /// interface a rendering collaborator consumes.
    #[must_use]
    pub fn line_codes(&self, line: u32) -> Option<&[u32]> {
        let (start, length) = self.line(line)?;
        self.store.slice(start, length)
    }

    /// The line decoded to an owned string; codes outside the scalar range
    /// are dropped.
    #[must_use]
    pub fn line_string(&self, line: u32) -> Option<String> {
        let codes = self.line_codes(line)?;
        Some(codes.iter().filter_map(|&code| char::from_u32(code)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Types `text` one character at a time through the edit protocol, the
    /// way an input handler delivers it.
    fn type_str(buffer: &mut TextBuffer, at: u64, text: &str) {
        for (position, ch) in text.chars().enumerate() {
            buffer
                .insert_char(at + position as u64, ch as u32)
                .expect("typed insert in range");
        }
    }

    #[test]
    fn test_typing_builds_store_and_index_together() {
        let mut buffer = TextBuffer::new();

        // "ab\ncd" typed character by character leaves exactly one break.
        type_str(&mut buffer, 0, "ab\ncd");

        assert_eq!(buffer.size(), 5);
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.line(0), Some((0, 2)));
        assert_eq!(buffer.line(1), Some((3, 2)));
        assert_eq!(buffer.line_string(0).as_deref(), Some("ab"));
        assert_eq!(buffer.line_string(1).as_deref(), Some("cd"));
    }

    #[test]
    fn test_deleting_the_break_merges_the_lines() {
        let mut buffer = TextBuffer::new();
        type_str(&mut buffer, 0, "ab\ncd");

        assert_eq!(buffer.delete_char(2).unwrap(), LINE_BREAK);

        assert!(buffer.line_index().is_empty());
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0), Some((0, 4)));
        assert_eq!(buffer.line_string(0).as_deref(), Some("abcd"));
    }

    #[test]
    fn test_plain_edits_shift_later_lines() {
        let mut buffer = TextBuffer::new();
        type_str(&mut buffer, 0, "ab\ncd");

        // Grow line 0; line 1 slides right without index surgery.
        buffer.insert_char(1, u32::from(b'x')).unwrap();
        assert_eq!(buffer.line(0), Some((0, 3)));
        assert_eq!(buffer.line(1), Some((4, 2)));

        // And back.
        buffer.delete_char(1).unwrap();
        assert_eq!(buffer.line(0), Some((0, 2)));
        assert_eq!(buffer.line(1), Some((3, 2)));
    }

    #[test]
    fn test_insert_past_end_modifies_nothing() {
        let mut buffer = TextBuffer::new();
        type_str(&mut buffer, 0, "ab\ncd");

        let result = buffer.insert_char(6, u32::from(b'!'));

        assert!(matches!(
            result,
            Err(crate::errors::EditError::OutOfRange(6))
        ));
        assert_eq!(buffer.size(), 5);
        assert_eq!(buffer.line(1), Some((3, 2)));
    }

    #[test]
    fn test_delete_past_end_modifies_nothing() {
        let mut buffer = TextBuffer::new();

        assert!(matches!(
            buffer.delete_char(0),
            Err(crate::errors::EditError::OutOfRange(0))
        ));
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn test_insert_run_shifts_once() {
        let mut buffer = TextBuffer::new();
        type_str(&mut buffer, 0, "ab\ncd");

        let spaces = [u32::from(b' '); 2];
        buffer.insert_run(1, &spaces).unwrap();

        assert_eq!(buffer.line_string(0).as_deref(), Some("a  b"));
        assert_eq!(buffer.line(1), Some((5, 2)));
    }

    #[test]
    fn test_from_bytes_matches_typed_input() {
        let text = "one\ntwo\nthree\n";
        let loaded = TextBuffer::from_bytes(text.as_bytes());
        let mut typed = TextBuffer::new();
        type_str(&mut typed, 0, text);

        assert_eq!(loaded.size(), typed.size());
        assert_eq!(loaded.line_count(), typed.line_count());
        for line in 0..loaded.line_count() {
            assert_eq!(loaded.line(line), typed.line(line));
        }
        // The trailing break leaves an empty final line.
        assert_eq!(loaded.line(3), Some((14, 0)));
    }

    #[test]
    fn test_open_bulk_loads_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"alpha\nbeta\n").unwrap();
        file.as_file().sync_all().unwrap();

        let buffer = TextBuffer::open(file.path()).expect("open should succeed");

        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_string(0).as_deref(), Some("alpha"));
        assert_eq!(buffer.line_string(1).as_deref(), Some("beta"));
        assert_eq!(buffer.line(2), Some((11, 0)));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = TextBuffer::open("/nonexistent/definitely/missing.txt");

        assert!(matches!(
            result,
            Err(crate::errors::EditError::IoError(_))
        ));
    }
}
