//! Application services and ports for execution retirement.

#![forbid(unsafe_code)]

mod deletion_service;
mod retirement_ports;
mod retirement_service;

pub use deletion_service::{BatchDeletion, BulkDeletionCoordinator};
pub use retirement_ports::{ExecutionApi, FilterMode, RetirementOptions, ScopeFailurePolicy};
pub use retirement_service::{RetirementService, RetirementSummary};
