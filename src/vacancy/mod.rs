//! Vacancy data model
//!
//! `VacancyRecord` is the unit every other module exchanges: the extractor
//! produces it, the reconciler classifies it, storage and notifications consume it.

mod record;

pub use record::{FullSet, VacancyRecord, NOT_SPECIFIED};
