//! Common types and helpers shared by the store, documents and collections.

mod auto_id;
mod constants;
mod fields;
mod type_utils;

pub use auto_id::*;
pub use constants::*;
pub use fields::*;
pub use type_utils::*;
