//! The one-time-code input widget.
//!
//! Six single-digit cells with an editing cursor. Purely local state; the
//! embedding UI renders the cells and forwards keystrokes, paste events
//! and cell clicks here.

/// Number of code cells.
pub const OTP_LEN: usize = 6;

/// Editing state of the 6-cell code input.
///
/// Invariants: every cell holds nothing or a single decimal digit; the
/// cursor always points at a valid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpInput {
    cells: [Option<char>; OTP_LEN],
    cursor: usize,
}

impl OtpInput {
    /// Creates an empty input with the cursor on the first cell.
    pub fn new() -> Self {
        Self {
            cells: [None; OTP_LEN],
            cursor: 0,
        }
    }

    /// The cell the cursor is on.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The digit in cell `index`, if any.
    pub fn cell(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    /// All cells, for rendering.
    pub fn cells(&self) -> &[Option<char>; OTP_LEN] {
        &self.cells
    }

    /// Moves the cursor, e.g. when a cell is clicked. Out-of-range
    /// indices are ignored.
    pub fn focus(&mut self, index: usize) {
        if index < OTP_LEN {
            self.cursor = index;
        }
    }

    /// Handles a single-character keystroke: stores the digit in the
    /// focused cell (replacing any previous digit) and advances the
    /// cursor unless it is already on the last cell. Non-digits are
    /// ignored.
    pub fn press(&mut self, ch: char) {
        if !ch.is_ascii_digit() {
            return;
        }
        self.cells[self.cursor] = Some(ch);
        if self.cursor + 1 < OTP_LEN {
            self.cursor += 1;
        }
    }

    /// Handles a multi-character input event (paste): strips non-digits,
    /// distributes one digit per cell starting at the cursor, clipped at
    /// the last cell, then moves the cursor to
    /// `min(start + pasted_digits, OTP_LEN - 1)`.
    pub fn paste(&mut self, text: &str) {
        let digits: Vec<char> = text.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return;
        }
        let start = self.cursor;
        for (offset, digit) in digits.iter().take(OTP_LEN - start).enumerate() {
            self.cells[start + offset] = Some(*digit);
        }
        self.cursor = (start + digits.len()).min(OTP_LEN - 1);
    }

    /// Handles Backspace. In an empty cell the cursor moves back one cell
    /// (a no-op on the first cell); in a filled cell only the digit is
    /// removed. The previous cell's digit is never deleted implicitly.
    pub fn backspace(&mut self) {
        if self.cells[self.cursor].is_some() {
            self.cells[self.cursor] = None;
        } else if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Number of filled cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// The complete code, only when all cells are filled.
    pub fn code(&self) -> Option<String> {
        if self.filled() == OTP_LEN {
            Some(self.cells.iter().flatten().collect())
        } else {
            None
        }
    }

    /// Empties every cell and returns the cursor to the first one.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for OtpInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_with(input: &OtpInput) -> String {
        input.cells().iter().map(|c| c.unwrap_or('_')).collect()
    }

    #[test]
    fn test_typing_advances_cursor() {
        let mut input = OtpInput::new();
        input.press('1');
        input.press('2');
        assert_eq!(filled_with(&input), "12____");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_typing_on_last_cell_stays() {
        let mut input = OtpInput::new();
        for ch in "123456".chars() {
            input.press(ch);
        }
        assert_eq!(input.cursor(), 5);
        input.press('9');
        assert_eq!(filled_with(&input), "123459");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_non_digit_is_ignored() {
        let mut input = OtpInput::new();
        input.press('a');
        input.press(' ');
        assert_eq!(input.filled(), 0);
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_paste_full_code_at_start() {
        let mut input = OtpInput::new();
        input.paste("123456");
        assert_eq!(filled_with(&input), "123456");
        assert_eq!(input.cursor(), 5);
        assert_eq!(input.code().as_deref(), Some("123456"));
    }

    #[test]
    fn test_paste_three_digits_at_cell_two() {
        let mut input = OtpInput::new();
        input.focus(2);
        input.paste("987");
        assert_eq!(filled_with(&input), "__987_");
        // min(2 + 3, 5) = 5
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_paste_clips_at_boundary() {
        let mut input = OtpInput::new();
        input.focus(4);
        input.paste("123456");
        assert_eq!(filled_with(&input), "____12");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_paste_strips_non_digits() {
        let mut input = OtpInput::new();
        input.paste("1a2-3 4\t5x6");
        assert_eq!(input.code().as_deref(), Some("123456"));
    }

    #[test]
    fn test_paste_without_digits_changes_nothing() {
        let mut input = OtpInput::new();
        input.focus(3);
        input.paste("abc");
        assert_eq!(input.filled(), 0);
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_backspace_in_empty_cell_moves_back() {
        let mut input = OtpInput::new();
        input.press('1');
        // cursor now on empty cell 1
        input.backspace();
        assert_eq!(input.cursor(), 0);
        // the digit in cell 0 survived
        assert_eq!(input.cell(0), Some('1'));
    }

    #[test]
    fn test_backspace_on_first_cell_is_noop_for_focus() {
        let mut input = OtpInput::new();
        input.backspace();
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_backspace_clears_filled_cell_without_moving() {
        let mut input = OtpInput::new();
        input.paste("123456");
        assert_eq!(input.cursor(), 5);
        input.backspace();
        assert_eq!(input.cell(5), None);
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_code_requires_all_cells() {
        let mut input = OtpInput::new();
        input.paste("12345");
        assert_eq!(input.filled(), 5);
        assert_eq!(input.code(), None);
    }

    #[test]
    fn test_clear() {
        let mut input = OtpInput::new();
        input.paste("123456");
        input.clear();
        assert_eq!(input.filled(), 0);
        assert_eq!(input.cursor(), 0);
    }
}
