pub mod builder;
pub mod types;

pub use builder::{build_chain, load_chain};
pub use types::{Chain, ChainStep, StatusBranch};
