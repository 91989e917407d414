use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Display value for any field the listing did not provide
pub const NOT_SPECIFIED: &str = "not specified";

/// The persisted full set of known vacancies, keyed by vacancy id
pub type FullSet = HashMap<String, VacancyRecord>;

/// A single vacancy posting as extracted from a listing page
///
/// Serialized with camelCase keys; this is the shape of every JSON snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyRecord {
    /// Last path segment of the canonical link
    pub id: String,

    pub title: String,

    pub company: String,

    /// Canonical link without query string or fragment
    pub link: String,

    /// Skills in display order; compared as a set
    #[serde(default)]
    pub skills: Vec<String>,

    pub salary: String,

    pub experience: String,

    pub location: String,

    pub publication_date: String,

    /// First time this id was ever observed
    pub created_at: DateTime<Utc>,
}

impl VacancyRecord {
    /// Creates a record with every optional field set to [`NOT_SPECIFIED`]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: NOT_SPECIFIED.to_string(),
            link: link.into(),
            skills: Vec::new(),
            salary: NOT_SPECIFIED.to_string(),
            experience: NOT_SPECIFIED.to_string(),
            location: NOT_SPECIFIED.to_string(),
            publication_date: NOT_SPECIFIED.to_string(),
            created_at,
        }
    }

    /// Returns true if any reconciled field differs from `other`
    ///
    /// Compared fields: title, company, salary, experience, location and
    /// skills (as an unordered set). Link, publication date and creation
    /// time never make a record "updated" on their own.
    pub fn differs_from(&self, other: &VacancyRecord) -> bool {
        self.title != other.title
            || self.company != other.company
            || self.salary != other.salary
            || self.experience != other.experience
            || self.location != other.location
            || self.skill_set() != other.skill_set()
    }

    /// Skills as a set, for order-insensitive comparison
    pub fn skill_set(&self) -> BTreeSet<&str> {
        self.skills.iter().map(String::as_str).collect()
    }

}
