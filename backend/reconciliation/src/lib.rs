//! The reconciliation core: the status-mapper decision table, the
//! order reconciliation engine and the per-family notification sources.

pub mod engine;
pub mod families;
pub mod status_mapper;
pub mod storage;

pub use engine::{CallbackOutcome, ReconciliationEngine};
