// ============================================================================
// ROCKET PARTS PLATFORM - SHARED PRIMITIVE TYPES
// ============================================================================
// Module: shared/src/types.rs
// Description: Pagination primitives shared by the order, inventory, and
//              payment domain models.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Pagination request mirroring spec.md §6's `limit`/`offset` query
/// params, capped at 100 with a default of 50.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;
    pub const DEFAULT_LIMIT: i64 = 50;

    pub fn normalized(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_to_max_and_defaults() {
        let p = Pagination {
            limit: Some(500),
            offset: None,
        };
        assert_eq!(p.normalized(), (100, 0));

        let p = Pagination {
            limit: None,
            offset: Some(10),
        };
        assert_eq!(p.normalized(), (50, 10));
    }
}
