pub mod applications;
pub mod batches;
pub mod certificates;
pub mod courses;
pub mod evaluations;
pub mod exams;
pub mod jobs;
pub mod records;
