//! Pagination for the analyzed-songs listing

/// Rows per page when the client does not ask
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page a client may request
pub const MAX_PAGE_SIZE: i64 = 50;

/// Sanitized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub limit: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl Pagination {
    /// Clamp a client request: page to at least 1, limit to [1, MAX_PAGE_SIZE]
    ///
    /// Pages past the end are kept as-is and simply come back empty.
    ///
    /// ```
    /// use songscout_server::pagination::Pagination;
    ///
    /// let p = Pagination::new(Some(3), Some(10));
    /// assert_eq!(p.offset, 20);
    ///
    /// let p = Pagination::new(Some(0), Some(500));
    /// assert_eq!((p.page, p.limit), (1, 50));
    /// ```
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        Self {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    /// Number of pages needed for `total` rows; zero for an empty table
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None);
        assert_eq!(p, Pagination { page: 1, limit: 20, offset: 0 });
    }

    #[test]
    fn test_offset_follows_page() {
        let p = Pagination::new(Some(2), Some(20));
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        assert_eq!(Pagination::new(Some(-4), None).page, 1);
        assert_eq!(Pagination::new(None, Some(0)).limit, 1);
        assert_eq!(Pagination::new(None, Some(51)).limit, 50);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let p = Pagination::new(Some(i64::MAX), Some(20));
        assert_eq!(p.page, i64::MAX);
        assert_eq!(p.offset, i64::MAX);
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(None, Some(20));
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(20), 1);
        assert_eq!(p.total_pages(41), 3);
    }
}
