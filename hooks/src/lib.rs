//! Data-fetching adapters over `story-schematics-core`.
//!
//! # Overview
//! Wraps every resource operation of `StorySchematicsApi` as a query, a
//! mutation or an offset-paginated infinite query, each with a stable
//! `QueryKey` that a caching layer can index on.
//!
//! # Design
//! - Three small traits form the seam: `Query::fetch_one`,
//!   `Mutation::mutate` and `InfiniteQuery::fetch_page`. Any async-state or
//!   caching library can drive them; this crate ships minimal blocking
//!   drivers (`fetch_query`, `MutationState`, `InfiniteQueryState`).
//! - Queries retry only `Internal` errors, bounded by a `RetryPolicy`.
//! - Page parameters are numeric offsets. The next offset advances by the
//!   length of the last page actually returned, not by the requested limit.

pub mod beats_sheet;
pub mod error;
pub mod infinite;
pub mod key;
pub mod logline;
pub mod query;
pub mod retry;
pub mod story_plan;

pub use error::HooksError;
pub use infinite::{InfiniteQuery, InfiniteQueryState, PaginationState};
pub use key::QueryKey;
pub use query::{fetch_query, Mutation, MutationState, MutationStatus, Query};
pub use retry::RetryPolicy;
