pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod records;
pub mod report;
pub mod resolve;

pub use config::{Config, Paths};
pub use error::{StageError, StageResult};
pub use pipeline::Pipeline;
