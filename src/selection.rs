/// Selected row of the filtered list, `None` when nothing is selected.
///
/// Movement is clamped to the list bounds and never wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = None;
    }

    pub fn move_down(&mut self, len: usize) {
        if len == 0 {
            self.index = None;
            return;
        }
        let next = self.index.map_or(0, |i| i + 1);
        self.index = Some(next.min(len - 1));
    }

    pub fn move_up(&mut self) {
        self.index = match self.index {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Select row `digit - 1` if it exists. Returns whether the key was used.
    pub fn jump_to_digit(&mut self, digit: u32, len: usize) -> bool {
        if !(1..=9).contains(&digit) {
            return false;
        }
        let target = (digit - 1) as usize;
        if target < len {
            self.index = Some(target);
            true
        } else {
            false
        }
    }

    pub fn selected<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.index.and_then(|i| items.get(i))
    }
}
