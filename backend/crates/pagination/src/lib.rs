//! Page-number pagination primitives shared by backend listing endpoints.
//!
//! Listing endpoints accept `page`/`per_page` query parameters and respond
//! with an envelope carrying `total`, `pages`, and `current_page` alongside
//! the items. This crate owns the normalisation rules (out-of-range values
//! are clamped, never rejected) so every endpoint paginates identically.

use serde::{Deserialize, Serialize};

/// Items returned per page when the caller does not ask for a size.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound on the page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Validation failures raised by the strict [`PageRequest::try_new`] constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Pages are numbered from one.
    #[error("page numbers start at 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("per_page must be at least 1")]
    ZeroPerPage,
}

/// Normalised pagination window requested by a caller.
///
/// Construct with [`PageRequest::from_params`] when reading query parameters;
/// missing or out-of-range values are clamped to sensible defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Strict constructor rejecting zero-valued parameters.
    pub fn try_new(page: u32, per_page: u32) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PageError::ZeroPerPage);
        }
        Ok(Self {
            page,
            per_page: per_page.min(MAX_PER_PAGE),
        })
    }

    /// Build a request from optional query parameters, clamping rather than
    /// failing: `page` defaults to 1, `per_page` to [`DEFAULT_PER_PAGE`], and
    /// oversized `per_page` values saturate at [`MAX_PER_PAGE`].
    pub fn from_params(page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }

    /// One-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Zero-based item offset of the window start.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Window length, for use as a query `LIMIT`.
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_params(None, None)
    }
}

/// Envelope metadata attached to every paginated response.
///
/// Serialises flat (`total`, `pages`, `current_page`) so response structs can
/// embed it with `#[serde(flatten)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Number of pages at the requested page size.
    pub pages: u64,
    /// The page this envelope holds.
    pub current_page: u32,
}

impl PageInfo {
    /// Compute envelope metadata for `total` matching items.
    pub fn new(total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page());
        Self {
            total,
            pages: total.div_ceil(per_page),
            current_page: request.page(),
        }
    }
}

/// One page of items plus its envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items within the requested window.
    pub items: Vec<T>,
    /// Envelope metadata for the full result set.
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// Map the items of the page, keeping the envelope metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}

/// Paginate an already-materialised result set.
///
/// Used by in-memory adapters; database adapters should push the window into
/// the query via [`PageRequest::offset`] and [`PageRequest::limit`] instead.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let info = PageInfo::new(items.len() as u64, request);
    let items = items
        .into_iter()
        .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
        .take(request.per_page() as usize)
        .collect();
    Page { items, info }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, DEFAULT_PER_PAGE)]
    #[case(Some(3), Some(25), 3, 25)]
    #[case(Some(0), Some(0), 1, DEFAULT_PER_PAGE)]
    #[case(Some(2), Some(10_000), 2, MAX_PER_PAGE)]
    fn from_params_clamps(
        #[case] page: Option<u32>,
        #[case] per_page: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::from_params(page, per_page);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[rstest]
    #[case(0, 10, PageError::ZeroPage)]
    #[case(1, 0, PageError::ZeroPerPage)]
    fn try_new_rejects_zero(#[case] page: u32, #[case] per_page: u32, #[case] expected: PageError) {
        assert_eq!(PageRequest::try_new(page, per_page), Err(expected));
    }

    #[rstest]
    fn offset_and_limit_derive_from_window() {
        let request = PageRequest::from_params(Some(3), Some(20));
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    fn page_info_rounds_page_count_up(#[case] total: u64, #[case] per_page: u32, #[case] pages: u64) {
        let info = PageInfo::new(total, PageRequest::from_params(None, Some(per_page)));
        assert_eq!(info.pages, pages);
    }

    #[rstest]
    fn paginate_slices_the_requested_window() {
        let items: Vec<u32> = (0..25).collect();
        let page = paginate(items, PageRequest::from_params(Some(2), Some(10)));
        assert_eq!(page.items, (10..20).collect::<Vec<u32>>());
        assert_eq!(page.info.total, 25);
        assert_eq!(page.info.pages, 3);
        assert_eq!(page.info.current_page, 2);
    }

    #[rstest]
    fn paginate_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest::from_params(Some(9), Some(10)));
        assert!(page.items.is_empty());
        assert_eq!(page.info.total, 3);
    }

    #[rstest]
    fn page_info_flattens_into_envelopes() {
        #[derive(serde::Serialize)]
        struct Envelope {
            items: Vec<u32>,
            #[serde(flatten)]
            page: PageInfo,
        }

        let envelope = Envelope {
            items: vec![1],
            page: PageInfo::new(1, PageRequest::default()),
        };
        let value = serde_json::to_value(&envelope).expect("serialises");
        assert_eq!(value["total"], 1);
        assert_eq!(value["pages"], 1);
        assert_eq!(value["current_page"], 1);
    }
}
