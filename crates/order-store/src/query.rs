/// Default page size when the caller asks for nothing or something out of range.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Limit/offset pagination for listing a user's orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    limit: i64,
    offset: i64,
}

impl ListQuery {
    /// Creates a normalized query.
    ///
    /// A limit outside `1..=100` falls back to 20; a negative offset becomes 0.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if (1..=MAX_LIMIT).contains(&limit) {
            limit
        } else {
            DEFAULT_LIMIT
        };
        Self {
            limit,
            offset: offset.max(0),
        }
    }

    /// Builds a query from optional request parameters.
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::new(limit.unwrap_or(DEFAULT_LIMIT), offset.unwrap_or(0))
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}
