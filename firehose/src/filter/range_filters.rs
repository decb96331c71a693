use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::common::{get_field, Fields};
use crate::errors::FirehoseResult;

use super::{compare_values, FilterProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }
}

/// Matches documents where a field orders before or after a value.
///
/// Values of a different type than the operand never match.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Value,
    mode: ComparisonMode,
}

impl ComparisonFilter {
    pub(crate) fn new(field_name: String, field_value: Value, mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            mode,
        }
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        Ok(get_field(entry, &self.field_name)
            .and_then(|value| compare_values(value, &self.field_value))
            .map(|ordering| self.mode.accepts(ordering))
            .unwrap_or(false))
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.mode.symbol(), self.field_value)
    }
}
