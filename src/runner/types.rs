use crate::assertion::AssertionResult;
use crate::http::{Method, Response};
use std::time::Duration;

/// 单个步骤的执行结果
#[derive(Debug, Clone)]
pub struct StepResult {
    /// 嵌套深度，顶层步骤为 0，每进入一层分支加 1
    pub depth: usize,

    /// 请求名称
    pub request: String,

    pub method: Method,

    /// 解析后的完整 URL
    pub url: String,

    /// 响应状态码
    pub status: u16,

    /// 执行耗时
    pub duration: Duration,

    /// 本步骤成功提取的变量名
    pub extracted: Vec<String>,

    /// 通过的断言结果
    pub assertions: Vec<AssertionResult>,

    /// 断言失败的原因，失败后链随即中止
    pub failure: Option<String>,

    /// 是否进入了状态码分支
    pub branched: bool,
}

impl StepResult {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// 步骤观察者，每个步骤收到响应后调用一次，包括断言失败的步骤
pub trait StepObserver: Send + Sync {
    fn on_step(&self, result: &StepResult, response: &Response);
}

/// 一次链执行的报告
#[derive(Debug, Clone)]
pub struct ChainReport {
    pub chain: String,

    /// 按执行顺序排列的步骤结果（分支中的步骤紧跟在触发它的步骤之后）
    pub steps: Vec<StepResult>,
}

impl ChainReport {
    pub fn new(chain: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            steps: Vec::new(),
        }
    }

    /// 已执行的请求数量
    pub fn request_count(&self) -> usize {
        self.steps.len()
    }

    /// 所有请求耗时之和
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// 通过的断言总数
    pub fn assertion_count(&self) -> usize {
        self.steps.iter().map(|s| s.assertions.len()).sum()
    }

    /// 某个请求被执行的次数
    pub fn executions_of(&self, request: &str) -> usize {
        self.steps.iter().filter(|s| s.request == request).count()
    }
}
