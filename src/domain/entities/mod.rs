//! Core domain entities.
//!
//! - [`LinkRecord`] - A persisted short link
//! - [`NewLinkRecord`] - Input for inserting a link
//! - [`LinkPatch`] - Partial update for management edits
//! - [`Resolution`] / [`LinkStats`] - Result of resolving a code or alias
//! - [`Page`] / [`PageRequest`] / [`LinkFilter`] - Listing support

pub mod link;
pub mod page;

pub use link::{LinkPatch, LinkRecord, LinkStats, NewLinkRecord, Resolution};
pub use page::{
    LinkFilter, Page, PageRequest, SortBy, SortDirection, SortField, parse_sort_by,
};
