//! Offset pagination shared by list endpoints.

use serde::Deserialize;

/// Default page size when the caller does not supply `limit`.
pub const DEFAULT_LIMIT: usize = 100;

/// Hard upper bound on `limit`.
pub const MAX_LIMIT: usize = 1000;

/// Offset/limit window over an ordered listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    /// Effective limit after clamping to [`MAX_LIMIT`].
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }

    /// Apply the window to an already-ordered iterator.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip)
            .take(self.effective_limit())
            .collect()
    }
}
