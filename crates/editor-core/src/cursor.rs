/// Caret addressed as (row, column) over a [`TextBuffer`].
///
/// `col == line length` means the caret sits past the last character, on the
/// break itself. `last_col` remembers the preferred column so vertical motion
/// through a short line snaps back out on the next long one.
///
/// [`TextBuffer`]: crate::text::TextBuffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: u32,
    pub col: u64,
    last_col: u64,
}

impl Cursor {
    #[must_use]
    pub fn new(row: u32, col: u64) -> Self {
        Self {
            row,
            col,
            last_col: col,
        }
    }

    /// Absolute store index under the caret.
    ///
    /// `None` when the caret points outside the current document, which
    /// only happens if it was positioned by hand.
    #[must_use]
    pub fn index(&self, text: &crate::text::TextBuffer) -> Option<u64> {
        let (start, length) = text.line(self.row)?;

        if self.col > length {
            return None;
        }

        Some(start + self.col)
    }

    /// Steps over the next character. Crossing a break lands at column zero
    /// of the next row.
    pub fn move_right(&mut self, text: &crate::text::TextBuffer) -> bool {
        let Some(index) = self.index(text) else {
            return false;
        };
        let Some(code) = text.store().get(index) else {
            return false;
        };

        if code == crate::text::LINE_BREAK {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }

        self.last_col = self.col;
        true
    }

    /// Steps back over the previous character, wrapping to the end of the
    /// previous line from column zero.
    pub fn move_left(&mut self, text: &crate::text::TextBuffer) -> bool {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            let Some((_, length)) = text.line(self.row - 1) else {
                return false;
            };
            self.row -= 1;
            self.col = length;
        } else {
            return false;
        }

        self.last_col = self.col;
        true
    }

    /// Moves one row up, clamping to the target line's length but keeping
    /// the preferred column for later moves.
    pub fn move_up(&mut self, text: &crate::text::TextBuffer) -> bool {
        if self.row == 0 {
            return false;
        }
        let Some((_, length)) = text.line(self.row - 1) else {
            return false;
        };

        self.row -= 1;
        self.col = self.last_col.min(length);
        true
    }

    /// Moves one row down, clamping like [`Cursor::move_up`].
    pub fn move_down(&mut self, text: &crate::text::TextBuffer) -> bool {
        let Some((_, length)) = text.line(self.row + 1) else {
            return false;
        };

        self.row += 1;
        self.col = self.last_col.min(length);
        true
    }
}
