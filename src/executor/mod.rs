mod models;
#[cfg(feature = "cli")]
mod printer;
mod runner;

pub use models::{
    derive_request_name, ExecutionResult, HttpMethod, RequestDraft, RequestSpec, ResponseRecord,
    SaveConfig,
};
#[cfg(feature = "cli")]
pub use printer::print_execution_result;
pub use runner::{execute_draft, execute_request};
