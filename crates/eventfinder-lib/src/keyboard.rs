//! Highlight cursor for keyboard navigation of suggestion dropdowns.

/// Highlighted row in a list of `len` items; `None` until the user moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightCursor {
    index: Option<usize>,
}

impl HighlightCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Next row, wrapping to the top.
    pub fn move_down(&mut self, len: usize) {
        if len == 0 {
            self.index = None;
            return;
        }
        self.index = match self.index {
            Some(i) if i + 1 < len => Some(i + 1),
            _ => Some(0),
        };
    }

    /// Previous row, wrapping to the bottom.
    pub fn move_up(&mut self, len: usize) {
        if len == 0 {
            self.index = None;
            return;
        }
        self.index = match self.index {
            Some(i) if i > 0 && i < len => Some(i - 1),
            _ => Some(len - 1),
        };
    }

    pub fn set(&mut self, index: Option<usize>) {
        self.index = index;
    }

    pub fn reset(&mut self) {
        self.index = None;
    }

    /// The highlighted item, if the cursor points inside `items`.
    pub fn selected<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.index.and_then(|i| items.get(i))
    }
}
