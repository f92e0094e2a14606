// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Structural passes over compiled format strings.
//!
//! Everything here works against static type metadata
//! ([`TypeRegistry`]) and never fetches data:
//!
//! - [`validate`] — checks every shorthand path against the type graph
//!   and reports positioned warnings/errors
//! - [`extract`] — builds the nested [`PreloadTree`] of relationships
//!   that must be fetched before synchronous evaluation can succeed

pub mod preload;
pub mod schema;
pub mod validate;

pub use preload::{extract, PreloadTree, MAX_PRELOAD_DEPTH};
pub use schema::{Member, TypeDescriptor, TypeRegistry};
pub use validate::validate;
