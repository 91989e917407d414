use crate::vacancy::{FullSet, VacancyRecord};

/// Outcome of reconciling one fresh batch against the known full set
#[derive(Debug, Clone, Default)]
pub struct ReconciliationResult {
    /// Records whose id was not known before
    pub new: Vec<VacancyRecord>,

    /// Records whose id was known but at least one compared field changed.
    /// Each carries the `created_at` of the record it replaced.
    pub updated: Vec<VacancyRecord>,

    /// The untouched prior records for ids that did not change
    pub unchanged: Vec<VacancyRecord>,

    /// The working full set after the batch; next cycle's prior set
    pub full_set: FullSet,
}

impl ReconciliationResult {
    /// Total number of classified records; always the batch length
    pub fn total(&self) -> usize {
        self.new.len() + self.updated.len() + self.unchanged.len()
    }

    /// New and updated records, in that order
    pub fn changed(&self) -> Vec<VacancyRecord> {
        self.new.iter().chain(self.updated.iter()).cloned().collect()
    }
}

/// Reconciles a freshly extracted batch against the prior full set
///
/// # Algorithm
///
/// Each record of the batch is looked up, in input order, in the working
/// full set (which starts as `prior`):
///
/// | Lookup | Compared fields | Partition | Working set |
/// |--------|-----------------|-----------|-------------|
/// | absent | - | `new` | record inserted |
/// | present | any differs | `updated` (with prior `created_at`) | record replaced |
/// | present | all equal | `unchanged` (the prior record) | untouched |
///
/// A batch that repeats an id is classified against the state already
/// modified by the earlier occurrence.
///
/// # Arguments
///
/// * `prior` - The full set persisted after the previous cycle
/// * `batch` - Records extracted during this cycle, in page order
///
/// # Returns
///
/// The three partitions plus the new full set
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use vacancy_watch::{reconcile, FullSet, VacancyRecord};
///
/// let now = Utc::now();
/// let a = VacancyRecord::new("1", "Rust Developer", "https://hh.kz/vacancy/1", now);
///
/// let first = reconcile(FullSet::new(), vec![a.clone()]);
/// assert_eq!(first.new.len(), 1);
///
/// let second = reconcile(first.full_set, vec![a]);
/// assert_eq!(second.unchanged.len(), 1);
/// ```
pub fn reconcile(prior: FullSet, batch: Vec<VacancyRecord>) -> ReconciliationResult {
    let mut result = ReconciliationResult {
        full_set: prior,
        ..Default::default()
    };

    for mut record in batch {
        match result.full_set.get(&record.id) {
            None => {
                result.new.push(record.clone());
                result.full_set.insert(record.id.clone(), record);
            }
            Some(known) if record.differs_from(known) => {
                record.created_at = known.created_at;
                result.updated.push(record.clone());
                result.full_set.insert(record.id.clone(), record);
            }
            Some(known) => {
                result.unchanged.push(known.clone());
            }
        }
    }

    tracing::debug!(
        "Reconciled batch: {} new, {} updated, {} unchanged, {} known",
        result.new.len(),
        result.updated.len(),
        result.unchanged.len(),
        result.full_set.len()
    );

    result
}
