//! Person lookups against the `person` collection.

use rollcall_core::Person;
use rollcall_store::{DocumentStore, StoreError};
use serde_json::Value;
use std::sync::Arc;

const PERSONS: &str = "person";
const STUDENT_KIND: &str = "student";

pub struct PersonDirectory<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> PersonDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Find a student by display name, the join between recognition output
    /// and store identity. `Ok(None)` when no student carries that name.
    pub fn find_student(&self, name: &str) -> Result<Option<Person>, StoreError> {
        let matches = self.store.find_by_field(PERSONS, "name", name)?;
        Ok(matches.into_iter().find_map(|(id, doc)| {
            let person = Person::from_document(&id, Value::Object(doc))?;
            (person.kind == STUDENT_KIND).then_some(person)
        }))
    }
}
