use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde_json::Value;

use crate::common::{get_field, Fields};
use crate::errors::FirehoseResult;

use super::{values_equal, FilterProvider};

/// A filter that matches all documents.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Fields) -> FirehoseResult<bool> {
        Ok(true)
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Matches documents where a field equals a value.
///
/// This is the filter a collection group uses to resolve its logical id.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        Ok(get_field(entry, &self.field_name)
            .map(|value| values_equal(value, &self.field_value))
            .unwrap_or(false))
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

/// Matches documents where a field exists and differs from a value.
pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Value,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl FilterProvider for NotEqualsFilter {
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        Ok(get_field(entry, &self.field_name)
            .map(|value| !values_equal(value, &self.field_value))
            .unwrap_or(false))
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

/// Matches documents where a field equals one of several values.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl InFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        Ok(get_field(entry, &self.field_name)
            .map(|value| self.field_values.iter().any(|v| values_equal(value, v)))
            .unwrap_or(false))
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.field_name, self.field_values.iter().join(", "))
    }
}

/// Matches documents where a field exists and equals none of several values.
pub(crate) struct NotInFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl NotInFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        NotInFilter {
            field_name,
            field_values,
        }
    }
}

impl FilterProvider for NotInFilter {
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        Ok(get_field(entry, &self.field_name)
            .map(|value| !self.field_values.iter().any(|v| values_equal(value, v)))
            .unwrap_or(false))
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} not in [{}])", self.field_name, self.field_values.iter().join(", "))
    }
}

/// Matches documents where an array field contains a value.
pub(crate) struct ArrayContainsFilter {
    field_name: String,
    element: Value,
}

impl ArrayContainsFilter {
    pub(crate) fn new(field_name: String, element: Value) -> Self {
        ArrayContainsFilter {
            field_name,
            element,
        }
    }
}

impl FilterProvider for ArrayContainsFilter {
    fn apply(&self, entry: &Fields) -> FirehoseResult<bool> {
        match get_field(entry, &self.field_name) {
            Some(Value::Array(items)) => Ok(items.iter().any(|v| values_equal(v, &self.element))),
            _ => Ok(false),
        }
    }
}

impl Display for ArrayContainsFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} contains {})", self.field_name, self.element)
    }
}
