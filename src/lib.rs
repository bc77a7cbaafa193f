pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod executor;
#[cfg(feature = "cli")]
pub mod interactive;
pub mod panel;
pub mod plugin;
pub mod shell;

pub use error::{ApiTesterError, ApiTesterResult};
