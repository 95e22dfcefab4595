//! Pagination module
//!
//! # Overview
//!
//! [`CursorPaginator`] drives a GET loop over a resource that reports its
//! continuation as an absolute `paging.next` URL. It can be consumed page by
//! page with [`CursorPaginator::next_page`], which returns control to the
//! caller between pages, or as a lazy record stream with
//! [`CursorPaginator::into_records`].

mod cursor;
mod types;

pub use cursor::{CursorPaginator, DEFAULT_TIMEOUT, PAGE_DELAY, PAGE_SIZE_PARAM};
pub use types::{ParamValue, QueryParams};
