//! Domain entities and invariants for execution retirement.

#![forbid(unsafe_code)]

mod deletion;
mod execution;
mod paging;
mod project;
mod retention;

pub use deletion::{DeletionFailure, DeletionOutcome};
pub use execution::{Execution, ExecutionId, ExecutionStatus, retain_deletable};
pub use paging::{PageRequest, PageSequence, page_count};
pub use project::{JobId, ProjectName, RetirementScope};
pub use retention::{RetentionUnit, RetentionWindow};
