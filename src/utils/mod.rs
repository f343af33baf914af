pub mod formatter;

pub use formatter::{ResponseFormat, ResponseFormatter, pretty_body, status_color};
