//! Teacher evaluations filled in by students or supervisors.

use crate::error::{Error, Result};
use crate::model::Record;
use crate::store::Document;
use crate::validation::{self, not_blank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvaluationStatus {
    #[default]
    Draft,
    Submitted,
}

/// Per-criterion scores on a 1 to 5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    #[validate(range(min = 1, max = 5))]
    pub knowledge: u8,
    #[validate(range(min = 1, max = 5))]
    pub communication: u8,
    #[validate(range(min = 1, max = 5))]
    pub practical_skills: u8,
    #[validate(range(min = 1, max = 5))]
    pub punctuality: u8,
}

impl Ratings {
    pub fn average(&self) -> f64 {
        let sum = u32::from(self.knowledge)
            + u32::from(self.communication)
            + u32::from(self.practical_skills)
            + u32::from(self.punctuality);
        f64::from(sum) / 4.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default)]
    pub id: String,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub teacher_name: String,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub evaluator_name: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[validate(nested)]
    pub ratings: Ratings,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comments: String,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Evaluation {
    pub fn average_rating(&self) -> f64 {
        self.ratings.average()
    }

    /// `Draft → Submitted`, after the form passes validation.
    pub fn submit(&mut self) -> Result<()> {
        if self.status == EvaluationStatus::Submitted {
            return Err(Error::InvalidTransition(format!(
                "evaluation `{}` was already submitted",
                self.id
            )));
        }
        validation::check(self)?;
        self.status = EvaluationStatus::Submitted;
        self.submitted_at = Some(Utc::now());
        Ok(())
    }
}

impl Document for Evaluation {
    const COLLECTION: &'static str = "evaluations";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Evaluation {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation(ratings: Ratings) -> Evaluation {
        Evaluation {
            id: "ev-1".into(),
            teacher_name: "Mei Lin".into(),
            evaluator_name: "Student council".into(),
            batch_id: Some("b-1".into()),
            ratings,
            comments: String::new(),
            status: EvaluationStatus::Draft,
            submitted_at: None,
        }
    }

    #[test]
    fn average_over_all_criteria() {
        let e = evaluation(Ratings {
            knowledge: 5,
            communication: 4,
            practical_skills: 4,
            punctuality: 2,
        });
        assert_eq!(e.average_rating(), 3.75);
    }

    #[test]
    fn submit_once() {
        let mut e = evaluation(Ratings {
            knowledge: 3,
            communication: 3,
            practical_skills: 3,
            punctuality: 3,
        });
        e.submit().unwrap();
        assert_eq!(e.status, EvaluationStatus::Submitted);
        assert!(e.submitted_at.is_some());
        assert!(matches!(e.submit(), Err(Error::InvalidTransition(_))));
    }

    #[test]
    fn ratings_outside_the_scale_block_submission() {
        let mut e = evaluation(Ratings {
            knowledge: 0,
            communication: 3,
            practical_skills: 6,
            punctuality: 3,
        });
        let Err(Error::Validation(errors)) = e.submit() else {
            panic!("expected validation failure");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["ratings.knowledge", "ratings.practicalSkills"]);
        assert_eq!(e.status, EvaluationStatus::Draft);
    }
}
