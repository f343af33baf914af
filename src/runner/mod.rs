pub mod executor;
pub mod reporter;
pub mod types;
pub mod writeback;

pub use executor::ChainRunner;
pub use reporter::ChainReporter;
pub use types::{ChainReport, StepObserver, StepResult};
pub use writeback::apply_to_config;
