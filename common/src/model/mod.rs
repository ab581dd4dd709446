pub mod application;
pub mod batch;
pub mod canvas;
pub mod certificate;
pub mod course;
pub mod evaluation;
pub mod exam;
pub mod template;

use crate::error::Result;
use crate::store::Document;
use crate::validation;
use validator::Validate;

/// A back-office entity created through the generic CRUD endpoints.
///
/// Clients may omit the id on creation; the storage boundary assigns one and
/// validates the record before anything is written.
pub trait Record: Document + Validate {
    fn set_id(&mut self, id: String);

    /// Field rules plus any cross-field rules the entity has.
    fn check(&self) -> Result<()> {
        validation::check(self)
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
