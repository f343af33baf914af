use crate::assertion::types::{Assertion, AssertionResult};
use crate::variable::{VariableContext, VariableResolver};
use crate::{ChainpostError, Result};

/// 执行单个断言求值
///
/// 两侧先基于当前变量上下文做替换，再比较
pub fn evaluate_assertion(
    index: usize,
    assertion: &Assertion,
    context: &VariableContext,
) -> AssertionResult {
    let left = VariableResolver::substitute(&assertion.left, context);
    let right = VariableResolver::substitute(&assertion.right, context);
    let passed = assertion.op.compare(&left, &right);

    AssertionResult {
        index,
        passed,
        left,
        op: assertion.op,
        right,
    }
}

/// 按声明顺序执行所有断言，遇到第一个失败立即返回错误
pub fn check_assertions(
    assertions: &[Assertion],
    context: &VariableContext,
) -> Result<Vec<AssertionResult>> {
    let mut results = Vec::with_capacity(assertions.len());

    for (i, assertion) in assertions.iter().enumerate() {
        let result = evaluate_assertion(i + 1, assertion, context);
        if !result.passed {
            return Err(ChainpostError::AssertionFailed {
                index: result.index,
                left: result.left,
                op: result.op.to_string(),
                right: result.right,
            });
        }
        tracing::debug!(
            "assertion {} passed: '{}' {} '{}'",
            result.index,
            result.left,
            result.op,
            result.right
        );
        results.push(result);
    }

    Ok(results)
}
