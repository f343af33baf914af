pub mod capture;
pub mod resolver;
pub mod types;

pub use capture::{CaptureError, VariableCapture, capture_variables};
pub use resolver::{Encoding, VariableResolver};
pub use types::{VariableContext, stringify_value};
