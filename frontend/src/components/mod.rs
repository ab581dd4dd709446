pub mod certificates;
pub mod helpers;
