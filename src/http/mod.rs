pub mod client;
pub mod request;
pub mod resolver;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::{Client, DEFAULT_TIMEOUT, HttpExecutor};
pub use request::{RequestBody, ResolvedRequest};
pub use resolver::{RequestResolver, step_context};
pub use response::Response;
pub use types::{Method, Status};
