//! Reconciliation of freshly scraped vacancies against the known set
//!
//! The reconciler is a pure function: it never touches the network or disk.
//! Loading the prior full set and persisting the returned one is the
//! coordinator's job.

mod reconciler;

pub use reconciler::{reconcile, ReconciliationResult};
