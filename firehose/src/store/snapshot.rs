use serde_json::Value;

use crate::common::{get_field, Fields};
use crate::store::DocumentRef;

/// A raw, untyped read of one document.
///
/// `data` is `None` when nothing is stored at the locator.
#[derive(Clone, Debug)]
pub struct Snapshot {
    locator: DocumentRef,
    data: Option<Fields>,
}

impl Snapshot {
    pub fn new(locator: DocumentRef, data: Option<Fields>) -> Self {
        Snapshot { locator, data }
    }

    pub fn found(locator: DocumentRef, data: Fields) -> Self {
        Snapshot::new(locator, Some(data))
    }

    pub fn missing(locator: DocumentRef) -> Self {
        Snapshot::new(locator, None)
    }

    pub fn id(&self) -> &str {
        self.locator.id()
    }

    pub fn locator(&self) -> &DocumentRef {
        &self.locator
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Fields> {
        self.data.as_ref()
    }

    /// Returns the value at a (possibly dotted) field path.
    pub fn get(&self, field_path: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| get_field(data, field_path))
    }

    pub fn into_parts(self) -> (DocumentRef, Option<Fields>) {
        (self.locator, self.data)
    }
}
