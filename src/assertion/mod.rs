/// 断言模块 - 基于变量的比较断言
mod evaluator;
mod types;

pub use evaluator::{check_assertions, evaluate_assertion};
pub use types::{Assertion, AssertionResult, CompareOp, InvalidOperator};
