mod api;
mod options;

pub use api::ExecutionApi;
pub use options::{FilterMode, RetirementOptions, ScopeFailurePolicy};
