//! Page number resolution. Bad input never fails: it lands on the first or last page.

use serde::Serialize;

pub const BOOKS_PER_PAGE: u32 = 12;
pub const REVIEWS_PER_PAGE: u32 = 5;

/// A resolved page window over `count` items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u32,
    pub num_pages: u32,
    pub count: i64,
    pub per_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    /// Resolve a raw `page` query value against a total count.
    /// Missing, non-integer or < 1 gives page 1; past the end gives the last page.
    /// Zero items still yields one (empty) page.
    pub fn resolve(raw: Option<&str>, count: i64, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let count = count.max(0);
        let num_pages = if count == 0 {
            1
        } else {
            let pages = (count as u64).div_ceil(per_page as u64);
            u32::try_from(pages).unwrap_or(u32::MAX)
        };
        let requested = raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let number = if requested < 1 {
            1
        } else if requested > num_pages as i64 {
            num_pages
        } else {
            requested as u32
        };
        PageInfo {
            number,
            num_pages,
            count,
            per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.per_page as i64
    }
}
