//! Predicates for queries.
//!
//! Filters are built with the fluent API and evaluated against raw stored
//! [`crate::common::Fields`]:
//!
//! ```rust,ignore
//! use firehose::filter::field;
//!
//! let adults = field("age").gte(18).and(field("status").eq("active"));
//! let query = users.query().filter(adults).limit(10);
//! ```
//!
//! Supported operators: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `in_array`,
//! `not_in`, `array_contains` and the logical `and`, `or`, `not`.
//! Comparisons between values of different types never match.

mod basic_filters;
mod compare;
mod filter;
mod fluent;
mod logical_filters;
mod range_filters;

pub use basic_filters::*;
pub use compare::*;
pub use filter::*;
pub use fluent::*;
pub use logical_filters::*;
pub use range_filters::*;
