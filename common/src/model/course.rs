use crate::model::Record;
use crate::store::Document;
use crate::validation::not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[validate(range(min = 1, max = 2000))]
    pub duration_hours: u32,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Document for Course {
    const COLLECTION: &'static str = "courses";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Course {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
