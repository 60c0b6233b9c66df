use chrono::NaiveDate;

use super::order::OrderStatus;

/// 1-based pagination request. `normalized` clamps out-of-range values the
/// same way for every listing so page arithmetic stays consistent.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: i64 = 20;
    pub const MAX_PER_PAGE: i64 = 100;

    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }.normalized()
    }

    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the bookkeeping the admin screens paginate with.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub page: i64,
    pub per_page: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: i64, request: PageRequest) -> Self {
        let request = request.normalized();
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + request.per_page - 1) / request.per_page
        };
        Self {
            items,
            total_items,
            total_pages,
            page: request.page,
            per_page: request.per_page,
            has_prev: request.page > 1,
            has_next: request.page < total_pages,
        }
    }
}

/// Filters applied identically to the page query and the count query of a
/// listing. Date bounds are inclusive whole days.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
