//! Selection + scroll bookkeeping for a list whose entries may span several
//! rendered lines.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub selected: usize,
    /// First rendered line shown.
    pub scroll_offset: usize,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Replace the items. `keep` picks the entry to stay selected, if it is
    /// still present; otherwise the selection is clamped.
    pub fn set_items(&mut self, items: Vec<T>, keep: impl Fn(&T) -> bool) {
        let pos = items.iter().position(keep);
        self.items = items;
        match pos {
            Some(p) => self.selected = p,
            None => self.selected = self.selected.min(self.items.len().saturating_sub(1)),
        }
        if self.items.is_empty() {
            self.scroll_offset = 0;
        }
    }

    pub fn select_up(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.items.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adjust `scroll_offset` so rendered lines `first..=last` fit in `height`.
    /// When the span is taller than the viewport its top wins.
    pub fn ensure_visible(&mut self, first: usize, last: usize, height: usize) {
        if height == 0 {
            return;
        }
        if first < self.scroll_offset {
            self.scroll_offset = first;
        } else if last >= self.scroll_offset + height {
            self.scroll_offset = (last + 1 - height).min(first);
        }
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}
