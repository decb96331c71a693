use serde_json::Value;
use smallvec::SmallVec;

use crate::common::FIELD_SEPARATOR;
use crate::errors::{ErrorKind, FirehoseError, FirehoseResult};

/// Raw, untyped document data as it is stored.
pub type Fields = serde_json::Map<String, Value>;

pub type FieldVec = SmallVec<[String; 8]>;

/// Splits a field path like `"address.city"` into its segments.
///
/// Fails if the path is empty or has an empty segment (`"a..b"`, `".a"`).
pub fn split_field_path(path: &str) -> FirehoseResult<FieldVec> {
    if path.is_empty() {
        log::error!("Field path cannot be empty");
        return Err(FirehoseError::new(
            "Field path cannot be empty",
            ErrorKind::InvalidPath,
        ));
    }

    let segments: FieldVec = path.split(FIELD_SEPARATOR).map(str::to_string).collect();
    if segments.iter().any(|s| s.is_empty()) {
        log::error!("Field path {} has an empty segment", path);
        return Err(FirehoseError::new(
            &format!("Field path {} has an empty segment", path),
            ErrorKind::InvalidPath,
        ));
    }
    Ok(segments)
}

/// Returns the value at `path`, looking for an exact top level key first and
/// then walking embedded objects.
pub fn get_field<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }
    if !path.contains(FIELD_SEPARATOR) {
        return None;
    }

    let mut segments = path.split(FIELD_SEPARATOR);
    let first = segments.next()?;
    let mut current = fields.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Puts `value` at the nested location named by `segments`.
///
/// Missing intermediate objects are created; an intermediate that is not an
/// object is replaced by one.
pub fn set_field(fields: &mut Fields, segments: &[String], value: Value) {
    match segments {
        [] => {}
        [last] => {
            fields.insert(last.clone(), value);
        }
        [head, rest @ ..] => {
            let entry = fields
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Fields::new()));
            if !entry.is_object() {
                *entry = Value::Object(Fields::new());
            }
            if let Value::Object(nested) = entry {
                set_field(nested, rest, value);
            }
        }
    }
}

/// Removes the value at the nested location named by `segments`.
///
/// Removing a missing field is a no-op. Parent objects are kept even when
/// they become empty.
pub fn remove_field(fields: &mut Fields, segments: &[String]) {
    match segments {
        [] => {}
        [last] => {
            fields.remove(last);
        }
        [head, rest @ ..] => {
            if let Some(Value::Object(nested)) = fields.get_mut(head) {
                remove_field(nested, rest);
            }
        }
    }
}
