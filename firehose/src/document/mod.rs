//! Typed, mutable projections of stored records.
//!
//! A [`Document`] keeps its domain fields in a dedicated `T` next to its
//! identity and locator, so field names can never collide with either.
//! [`Patch`] carries partial edits with the [`FieldValue`] merge sentinel.

mod document;
mod patch;

pub use document::*;
pub use patch::*;
