use crate::error::{Error, Result};
use crate::model::Record;
use crate::store::Document;
use crate::validation::{self, not_blank, FieldError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where a batch stands relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchPhase {
    Upcoming,
    Running,
    Finished,
}

/// A scheduled cohort of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default)]
    pub id: String,
    /// Course this batch runs, when it has been linked to one.
    #[serde(default)]
    pub course_id: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub name: String,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub instructor: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 1, max = 500))]
    pub capacity: u32,
    #[serde(default)]
    pub enrolled: u32,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub schedule: String,
}

impl Batch {
    pub fn seats_remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }

    pub fn is_full(&self) -> bool {
        self.seats_remaining() == 0
    }

    /// Takes one seat.
    pub fn enroll(&mut self) -> Result<()> {
        if self.is_full() {
            return Err(Error::InvalidTransition(format!(
                "batch `{}` is full ({} of {} seats taken)",
                self.name, self.enrolled, self.capacity
            )));
        }
        self.enrolled += 1;
        Ok(())
    }

    pub fn phase(&self, today: NaiveDate) -> BatchPhase {
        if today < self.start_date {
            BatchPhase::Upcoming
        } else if today <= self.end_date {
            BatchPhase::Running
        } else {
            BatchPhase::Finished
        }
    }
}

impl Document for Batch {
    const COLLECTION: &'static str = "batches";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Batch {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn check(&self) -> Result<()> {
        let mut errors = match validation::check(self) {
            Ok(()) => Vec::new(),
            Err(Error::Validation(errors)) => errors,
            Err(other) => return Err(other),
        };
        if self.end_date < self.start_date {
            errors.push(FieldError::new("endDate", "must not be before the start date"));
        }
        if self.enrolled > self.capacity {
            errors.push(FieldError::new("enrolled", "must not exceed the capacity"));
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

    fn batch(capacity: u32, enrolled: u32) -> Batch {
        Batch {
            id: "b-1".into(),
            course_id: Some("c-1".into()),
            name: "Spring cohort".into(),
            instructor: "Mei Lin".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 30).unwrap(),
            capacity,
            enrolled,
            schedule: "Mon/Wed 18:00".into(),
        }
    }

    #[test]
    fn enrolling_stops_at_capacity() {
        let mut b = batch(2, 1);
        assert_eq!(b.seats_remaining(), 1);
        b.enroll().unwrap();
        assert!(b.is_full());
        assert!(matches!(b.enroll(), Err(Error::InvalidTransition(_))));
        assert_eq!(b.enrolled, 2);
    }

    #[test]
    fn phase_follows_the_calendar() {
        let b = batch(10, 0);
        let day = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        assert_eq!(b.phase(day(2, 28)), BatchPhase::Upcoming);
        assert_eq!(b.phase(day(3, 1)), BatchPhase::Running);
        assert_eq!(b.phase(day(5, 30)), BatchPhase::Running);
        assert_eq!(b.phase(day(5, 31)), BatchPhase::Finished);
    }

    #[test]
    fn cross_field_rules() {
        let mut b = batch(5, 6);
        b.end_date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let Err(Error::Validation(errors)) = b.check() else {
            panic!("expected validation failure");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["endDate", "enrolled"]);
    }
}
