//! # paraseek core
//!
//! Shared, WASM-safe logic for paraseek: file models, paragraph
//! segmentation, query compilation, ranked search, highlighting,
//! paragraph mutation, and the storage abstraction.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage is
//! consumed through the [`store::FileStore`] trait and driven by the
//! [`library::Library`], which is the only component that holds state.
//!
//! ```text
//! upload ─▶ segment ─▶ FileStore::put
//! query  ─▶ compile ─▶ search ─▶ highlight
//! edit   ─▶ mutate  ─▶ FileStore::put ─▶ segment ─▶ refresh results
//! ```

pub mod context;
pub mod error;
pub mod highlight;
pub mod library;
pub mod models;
pub mod mutate;
pub mod normalize;
pub mod query;
pub mod search;
pub mod segment;
pub mod store;

pub use error::{Error, Result};
