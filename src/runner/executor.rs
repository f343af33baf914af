use crate::assertion::check_assertions;
use crate::chain::{Chain, ChainStep, load_chain};
use crate::config::{Config, RequestTemplate};
use crate::http::{HttpExecutor, RequestResolver, ResolvedRequest, Response, step_context};
use crate::runner::types::{ChainReport, StepObserver, StepResult};
use crate::variable::{VariableContext, capture_variables};
use crate::{ChainpostError, Result};
use tokio_util::sync::CancellationToken;

/// 链执行器
///
/// 按文档顺序执行步骤，提取变量、校验断言，并在状态码匹配时递归进入分支。
/// 任何错误都会立即中止整条链。
pub struct ChainRunner<'a, E: HttpExecutor> {
    config: &'a Config,
    client: &'a E,
    cancel: CancellationToken,
    observer: Option<Box<dyn StepObserver + 'a>>,
}

impl<'a, E: HttpExecutor> ChainRunner<'a, E> {
    pub fn new(config: &'a Config, client: &'a E) -> Self {
        Self {
            config,
            client,
            cancel: CancellationToken::new(),
            observer: None,
        }
    }

    /// 使用外部的取消令牌（例如 Ctrl-C 处理）
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// 每执行完一个步骤就通知观察者（例如打印进度的 `ChainReporter`）
    pub fn with_observer(mut self, observer: impl StepObserver + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// 按名称加载并执行链
    pub async fn run_named(&self, name: &str) -> Result<ChainReport> {
        let chain = load_chain(self.config, name)?;
        self.run_chain(&chain).await
    }

    /// 在空的变量上下文中执行链
    pub async fn run_chain(&self, chain: &Chain) -> Result<ChainReport> {
        let mut context = VariableContext::new();
        self.run_chain_with(chain, &mut context).await
    }

    /// 在给定的变量上下文中执行链，执行结束后上下文保留所有提取的变量
    pub async fn run_chain_with(
        &self,
        chain: &Chain,
        context: &mut VariableContext,
    ) -> Result<ChainReport> {
        tracing::info!("Running chain '{}'", chain.name);

        let mut report = ChainReport::new(&chain.name);
        self.run_steps(&chain.steps, 0, context, &mut report)
            .await
            .map_err(|e| ChainpostError::ChainFailed {
                chain: chain.name.clone(),
                source: Box::new(e),
            })?;

        tracing::info!(
            "Chain '{}' finished: {} requests",
            chain.name,
            report.request_count()
        );
        Ok(report)
    }

    async fn run_steps(
        &self,
        steps: &[ChainStep],
        depth: usize,
        context: &mut VariableContext,
        report: &mut ChainReport,
    ) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            let request_name = step.request.trim();
            if request_name.is_empty() {
                return Err(ChainpostError::MissingRequestField { step: index + 1 });
            }

            // 步骤变量只影响本步骤的请求解析
            let request = {
                let effective = step_context(context, &step.variables);
                RequestResolver::new(self.config).resolve_named(request_name, &effective)?
            };

            let response = self.send(request_name, &request).await?;
            let status = response.status.code();

            let extracted = capture_variables(request_name, &response.body, &step.extract, context);
            let (assertions, failure) = match check_assertions(&step.assertions, context) {
                Ok(results) => (results, None),
                Err(e) => (Vec::new(), Some(e)),
            };

            let branch = step.branch_for(status).filter(|_| failure.is_none());
            let result = StepResult {
                depth,
                request: request_name.to_string(),
                method: request.method,
                url: request.url,
                status,
                duration: response.duration,
                extracted,
                assertions,
                failure: failure.as_ref().map(ToString::to_string),
                branched: branch.is_some(),
            };
            // 失败的步骤也先交给观察者，再中止
            if let Some(observer) = &self.observer {
                observer.on_step(&result, &response);
            }
            if let Some(e) = failure {
                return Err(e);
            }
            report.steps.push(result);

            if let Some(branch) = branch {
                tracing::debug!("Status {} matched branch of '{}'", status, request_name);
                Box::pin(self.run_steps(branch, depth + 1, context, report)).await?;
            }
        }

        Ok(())
    }

    /// 执行单个已保存的请求（不带变量）
    pub async fn run_request(&self, name: &str) -> Result<(ResolvedRequest, Response)> {
        let template = self.config.request(name)?;
        self.run_template(name, template).await
    }

    /// 执行请求模板，返回解析后的请求和响应
    pub async fn run_template(
        &self,
        name: &str,
        template: &RequestTemplate,
    ) -> Result<(ResolvedRequest, Response)> {
        let request =
            RequestResolver::new(self.config).resolve(template, &VariableContext::new())?;
        let response = self.send(name, &request).await?;
        Ok((request, response))
    }

    /// 发送请求，传输错误包装为带请求名的错误
    async fn send(&self, name: &str, request: &ResolvedRequest) -> Result<Response> {
        if self.cancel.is_cancelled() {
            return Err(ChainpostError::Cancelled);
        }

        tracing::debug!("Executing '{}': {}", name, request);

        tokio::select! {
            _ = self.cancel.cancelled() => Err(ChainpostError::Cancelled),
            result = self.client.execute(request) => result.map_err(|e| ChainpostError::Transport {
                request: name.to_string(),
                source: Box::new(e),
            }),
        }
    }
}
