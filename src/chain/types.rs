use crate::assertion::Assertion;
use crate::variable::VariableCapture;

/// 命名的请求链
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub name: String,
    pub steps: Vec<ChainStep>,
}

impl Chain {
    pub fn new(name: impl Into<String>, steps: Vec<ChainStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// 链中步骤总数（包含所有分支）
    pub fn step_count(&self) -> usize {
        count_steps(&self.steps)
    }
}

fn count_steps(steps: &[ChainStep]) -> usize {
    steps
        .iter()
        .map(|s| 1 + s.branches.iter().map(|b| count_steps(&b.steps)).sum::<usize>())
        .sum()
}

/// 链中的单个步骤
///
/// 步骤构成一棵树：`branches` 中的每个分支拥有自己的子步骤列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainStep {
    /// 请求名称
    pub request: String,

    /// 响应变量提取，按变量名排序
    pub extract: Vec<VariableCapture>,

    /// 按声明顺序执行的断言
    pub assertions: Vec<Assertion>,

    /// 仅对本步骤生效的变量（名称, 模板）
    pub variables: Vec<(String, String)>,

    /// 状态码分支
    pub branches: Vec<StatusBranch>,
}

/// 状态码匹配时执行的子步骤
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBranch {
    pub status: u16,
    pub steps: Vec<ChainStep>,
}

impl ChainStep {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            ..Self::default()
        }
    }

    pub fn with_extract(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.extract.push(VariableCapture::new(name, path));
        self
    }

    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.variables.push((name.into(), template.into()));
        self
    }

    pub fn on_status(mut self, status: u16, steps: Vec<ChainStep>) -> Self {
        self.branches.push(StatusBranch { status, steps });
        self
    }

    /// 查找与状态码匹配的分支
    pub fn branch_for(&self, status: u16) -> Option<&[ChainStep]> {
        self.branches
            .iter()
            .find(|b| b.status == status)
            .map(|b| b.steps.as_slice())
    }
}
