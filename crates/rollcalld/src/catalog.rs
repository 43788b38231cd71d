//! Typed reads over the `courses` collection.

use rollcall_core::Course;
use rollcall_store::{DocumentStore, StoreError};
use serde_json::Value;
use std::sync::Arc;

const COURSES: &str = "courses";

pub struct CourseCatalog<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> CourseCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All courses, in store iteration order. Documents that do not parse
    /// as courses are skipped with a warning.
    pub fn all(&self) -> Result<Vec<Course>, StoreError> {
        let mut courses = Vec::new();
        for (id, doc) in self.store.list(COURSES)? {
            match Course::from_document(&id, Value::Object(doc)) {
                Some(course) => courses.push(course),
                None => tracing::warn!(course = %id, "skipping malformed course document"),
            }
        }
        Ok(courses)
    }

    /// One course by id.
    pub fn get(&self, course_id: &str) -> Result<Option<Course>, StoreError> {
        Ok(self
            .store
            .get(&format!("{COURSES}/{course_id}"))?
            .and_then(|doc| Course::from_document(course_id, Value::Object(doc))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::seed_course;
    use rollcall_store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_all_skips_malformed_documents() {
        let store = Arc::new(MemoryStore::new());
        seed_course(&*store, "C1", json!({"name": "DB", "students": [], "schedule": []}));
        seed_course(&*store, "C2", json!({"students": "not-a-course"}));

        let catalog = CourseCatalog::new(store);
        let courses = catalog.all().unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, "C1");
    }

    #[test]
    fn test_get_missing_is_none() {
        let catalog = CourseCatalog::new(Arc::new(MemoryStore::new()));
        assert!(catalog.get("C9").unwrap().is_none());
    }
}
