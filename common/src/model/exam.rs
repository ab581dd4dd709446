//! Multiple-choice exams and grading of submitted attempts.

use crate::error::{Error, Result};
use crate::model::Record;
use crate::store::Document;
use crate::validation::{self, not_blank, FieldError};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[validate(custom(function = "not_blank"))]
    pub prompt: String,
    #[validate(length(min = 2, max = 8))]
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_option: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1))]
    pub course_id: String,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub title: String,
    #[validate(range(min = 5, max = 300))]
    pub duration_minutes: u32,
    /// Minimum score, in percent, needed to pass.
    #[validate(range(max = 100))]
    pub pass_mark: u8,
    #[validate(length(min = 1), nested)]
    pub questions: Vec<Question>,
}

/// Answers in question order; `None` for a skipped question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSubmission {
    pub answers: Vec<Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub exam_id: String,
    pub correct: usize,
    pub total: usize,
    pub score_percent: f64,
    pub passed: bool,
}

impl Exam {
    /// Scores `submission`. Skipped, out-of-range and missing answers count as
    /// wrong; answers past the last question are ignored.
    pub fn grade(&self, submission: &ExamSubmission) -> ExamResult {
        let total = self.questions.len();
        let correct = self
            .questions
            .iter()
            .zip(submission.answers.iter())
            .filter(|(question, answer)| **answer == Some(question.correct_option))
            .count();
        let score_percent = if total == 0 {
            0.0
        } else {
            (correct as f64 * 10_000.0 / total as f64).round() / 100.0
        };
        ExamResult {
            exam_id: self.id.clone(),
            correct,
            total,
            score_percent,
            passed: total > 0 && score_percent >= f64::from(self.pass_mark),
        }
    }
}

impl Document for Exam {
    const COLLECTION: &'static str = "exams";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Exam {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn check(&self) -> Result<()> {
        let mut errors = match validation::check(self) {
            Ok(()) => Vec::new(),
            Err(Error::Validation(errors)) => errors,
            Err(other) => return Err(other),
        };
        for (index, question) in self.questions.iter().enumerate() {
            if question.correct_option >= question.options.len() {
                errors.push(FieldError::new(
                    format!("questions[{index}].correctOption"),
                    "must point at one of the options",
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> Question {
        Question {
            prompt: "Which stroke is used for warming up?".into(),
            options: vec!["Effleurage".into(), "Tapotement".into(), "Friction".into()],
            correct_option: correct,
        }
    }

    fn exam(pass_mark: u8) -> Exam {
        Exam {
            id: "e-1".into(),
            course_id: "c-1".into(),
            title: "Swedish massage basics".into(),
            duration_minutes: 30,
            pass_mark,
            questions: vec![question(0), question(1), question(2)],
        }
    }

    #[test]
    fn grading_counts_exact_matches() {
        let result = exam(60).grade(&ExamSubmission {
            answers: vec![Some(0), Some(1), Some(0)],
        });
        assert_eq!(result.correct, 2);
        assert_eq!(result.total, 3);
        assert_eq!(result.score_percent, 66.67);
        assert!(result.passed);
    }

    #[test]
    fn skipped_and_missing_answers_are_wrong() {
        let result = exam(50).grade(&ExamSubmission {
            answers: vec![None, Some(1)],
        });
        assert_eq!(result.correct, 1);
        assert_eq!(result.score_percent, 33.33);
        assert!(!result.passed);
    }

    #[test]
    fn pass_mark_is_inclusive() {
        let result = exam(100).grade(&ExamSubmission {
            answers: vec![Some(0), Some(1), Some(2), Some(7)],
        });
        assert_eq!(result.score_percent, 100.0);
        assert!(result.passed);
    }

    #[test]
    fn questions_must_be_answerable() {
        let mut e = exam(70);
        e.questions[1].correct_option = 3;
        e.questions[2].options.truncate(1);
        e.questions[2].correct_option = 0;
        let Err(Error::Validation(errors)) = e.check() else {
            panic!("expected validation failure");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"questions[1].correctOption"));
        assert!(fields.contains(&"questions[2].options"));
    }

    #[test]
    fn exams_need_questions() {
        let mut e = exam(70);
        e.questions.clear();
        assert!(e.check().is_err());
    }
}
