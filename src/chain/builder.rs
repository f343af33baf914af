use crate::assertion::{Assertion, CompareOp};
use crate::chain::types::{Chain, ChainStep, StatusBranch};
use crate::config::{ChainStepConfig, Config};
use crate::variable::VariableCapture;
use crate::{ChainpostError, Result};

/// 将配置中的原始步骤转换为类型化的链
///
/// 运算符和状态码在这里校验，执行前就能发现配置错误；
/// 空的 `request` 留到执行该步骤时再报错
pub fn build_chain(name: &str, steps: &[ChainStepConfig]) -> Result<Chain> {
    Ok(Chain::new(name, build_steps(steps)?))
}

/// 从配置中查找并构建链
pub fn load_chain(config: &Config, name: &str) -> Result<Chain> {
    build_chain(name, config.chain_steps(name)?)
}

fn build_steps(steps: &[ChainStepConfig]) -> Result<Vec<ChainStep>> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| build_step(i + 1, step))
        .collect()
}

fn build_step(index: usize, raw: &ChainStepConfig) -> Result<ChainStep> {
    let assertions = raw
        .assertions
        .iter()
        .map(|a| {
            let op = a.op.parse::<CompareOp>().map_err(|_| ChainpostError::UnknownOperator {
                op: a.op.clone(),
                step: index,
            })?;
            Ok(Assertion::new(a.left.clone(), op, a.right.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut branches = Vec::with_capacity(raw.on_status.len());
    for (code, steps) in &raw.on_status {
        let status = parse_status_code(code).ok_or_else(|| ChainpostError::InvalidStatusCode {
            code: code.clone(),
            step: index,
        })?;
        branches.push(StatusBranch {
            status,
            steps: build_steps(steps)?,
        });
    }

    Ok(ChainStep {
        request: raw.request.trim().to_string(),
        extract: raw
            .extract
            .iter()
            .map(|(name, path)| VariableCapture::new(name.clone(), path.clone()))
            .collect(),
        assertions,
        variables: raw
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        branches,
    })
}

fn parse_status_code(code: &str) -> Option<u16> {
    code.trim()
        .parse::<u16>()
        .ok()
        .filter(|c| (100..600).contains(c))
}
