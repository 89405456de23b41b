//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use serde::Deserialize;

/// Pagination parameters as they arrive from the query string.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    #[serde(default = "default_page")]
    pub page: u32,
    /// items per page
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 { 1 }
fn default_limit() -> u32 { 20 }

impl Pagination {
    /// Clamp to sane defaults and return `(offset, limit)` for slicing.
    pub fn normalize(self) -> (usize, usize) {
        let page = if self.page == 0 { 1 } else { self.page };
        let limit = self.limit.clamp(1, 100);
        (((page - 1) as usize) * limit as usize, limit as usize)
    }

    /// Clamped values for response metadata.
    pub fn clamped(self) -> (u32, u32) {
        let page = if self.page == 0 { 1 } else { self.page };
        (page, self.limit.clamp(1, 100))
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: 20 } }
}

/// Apply pagination to an already-filtered vector, returning the page slice.
pub fn paginate<T>(items: Vec<T>, p: Pagination) -> Vec<T> {
    let (offset, limit) = p.normalize();
    items.into_iter().skip(offset).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (offset, limit) = Pagination { page: 0, limit: 0 }.normalize();
        assert_eq!(offset, 0);
        assert_eq!(limit, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (offset, limit) = Pagination { page: 5, limit: 1000 }.normalize();
        assert_eq!(offset, 400);
        assert_eq!(limit, 100);
    }

    #[test]
    fn paginate_slices_pages() {
        let items: Vec<i32> = (0..45).collect();
        let page2 = paginate(items.clone(), Pagination { page: 2, limit: 20 });
        assert_eq!(page2.first(), Some(&20));
        assert_eq!(page2.len(), 20);
        let page3 = paginate(items, Pagination { page: 3, limit: 20 });
        assert_eq!(page3.len(), 5);
    }
}
