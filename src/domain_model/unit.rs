use serde::Deserialize;

/// Limit/offset window over a listing in store order.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Deserialize)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Page {
    pub fn all() -> Self {
        Page::default()
    }

    pub fn new(limit: Option<u32>, offset: u32) -> Self {
        Page { limit, offset }
    }

    /// Applies the window to an already ordered iterator.
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let items = items.skip(self.offset as usize);
        match self.limit {
            Some(limit) => items.take(limit as usize).collect(),
            None => items.collect(),
        }
    }
}
