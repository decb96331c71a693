use serde::Serialize;
use serde_json::Value;

use crate::common::{remove_field, set_field, split_field_path, Fields};
use crate::errors::{FirehoseError, FirehoseResult};

/// What an edit does to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Replaces the field's value. Objects are replaced whole, not merged.
    Set(Value),
    /// Leaves the field as it is.
    Unchanged,
    /// Removes the field.
    Delete,
}

impl FieldValue {
    pub fn set<V: Into<Value>>(value: V) -> Self {
        FieldValue::Set(value.into())
    }
}

/// A partial edit of a document's fields.
///
/// Keys are field paths. A top level key (`"address"`) replaces that whole
/// value; a dotted key (`"address.city"`) reaches into nested objects and
/// creates missing ones along the way. Entries apply in insertion order.
///
/// ```rust,ignore
/// let patch = Patch::new()
///     .set("name", "Jiro")
///     .set("address.city", "Osaka")
///     .unchanged("age")
///     .delete("nickname");
/// user.edit(patch)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: Vec<(String, FieldValue)>,
}

impl Patch {
    pub fn new() -> Self {
        Patch::default()
    }

    pub fn with(mut self, path: &str, value: FieldValue) -> Self {
        self.entries.push((path.to_string(), value));
        self
    }

    pub fn set<V: Into<Value>>(self, path: &str, value: V) -> Self {
        self.with(path, FieldValue::Set(value.into()))
    }

    /// Sets a field from any serializable value, e.g. a nested struct.
    pub fn set_serialized<V: Serialize>(self, path: &str, value: &V) -> FirehoseResult<Self> {
        let value = serde_json::to_value(value).map_err(|err| {
            log::error!("Failed to serialize value for {}: {}", path, err);
            FirehoseError::from(err)
        })?;
        Ok(self.with(path, FieldValue::Set(value)))
    }

    pub fn unchanged(self, path: &str) -> Self {
        self.with(path, FieldValue::Unchanged)
    }

    pub fn delete(self, path: &str) -> Self {
        self.with(path, FieldValue::Delete)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(path, value)| (path.as_str(), value))
    }

    /// Applies every entry to `data`.
    ///
    /// Path errors are reported before anything is written.
    pub fn apply(&self, data: &mut Fields) -> FirehoseResult<()> {
        let mut resolved = Vec::with_capacity(self.entries.len());
        for (path, value) in &self.entries {
            resolved.push((split_field_path(path)?, value));
        }

        for (segments, value) in resolved {
            match value {
                FieldValue::Set(value) => set_field(data, &segments, value.clone()),
                FieldValue::Unchanged => {}
                FieldValue::Delete => remove_field(data, &segments),
            }
        }
        Ok(())
    }
}

impl From<Fields> for Patch {
    /// Every top level entry of `fields` becomes a [`FieldValue::Set`].
    fn from(fields: Fields) -> Self {
        Patch {
            entries: fields
                .into_iter()
                .map(|(key, value)| (key, FieldValue::Set(value)))
                .collect(),
        }
    }
}
