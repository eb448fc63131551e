//! folio-state — embedded content store for folio.
//!
//! Backed by [redb](https://docs.rs/redb). Holds the flat key → value
//! content-override table and the append-only visit log.
//!
//! # Architecture
//!
//! Values are JSON-serialized into redb's `&[u8]` value columns. Content
//! keys are stored verbatim; namespacing such as `exp.0.title` is a caller
//! convention (see `folio_core::keys`) and means nothing to the store.
//!
//! The `ContentStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use folio_core::{ContentEntry, ContentMap};
pub use store::ContentStore;
pub use types::*;
