pub mod loader;
pub mod types;

pub use loader::{ConfigFile, ConfigLoader};
pub use types::{AssertionConfig, AuthConfig, ChainStepConfig, Config, RequestTemplate};
