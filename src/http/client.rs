use std::future::Future;
use std::time::{Duration, Instant};

use crate::Result;
use crate::http::request::{RequestBody, ResolvedRequest};
use crate::http::response::Response;

/// 默认请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 执行已解析请求的 HTTP 后端
///
/// 链执行器只依赖这个 trait，测试中可以换成脚本化的实现
pub trait HttpExecutor {
    fn execute(&self, request: &ResolvedRequest) -> impl Future<Output = Result<Response>> + Send;
}

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// 使用配置中的超时秒数，未配置时为 30 秒
    pub fn with_timeout_secs(timeout_secs: Option<u64>) -> Result<Self> {
        Self::new(timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT))
    }
}

impl HttpExecutor for Client {
    async fn execute(&self, request: &ResolvedRequest) -> Result<Response> {
        let url = reqwest::Url::parse(&request.url)?;
        let mut req = self.inner.request(request.method.to_reqwest(), url);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some((username, password)) = &request.basic_auth {
            req = req.basic_auth(username, Some(password));
        }

        match &request.body {
            Some(RequestBody::Text(text)) => req = req.body(text.clone()),
            Some(RequestBody::File(path)) => {
                let content = tokio::fs::read(path).await?;
                req = req.body(content);
            }
            None => {}
        }

        tracing::debug!("-> {}", request);

        let start = Instant::now();
        let response = req.send().await?;
        let duration = start.elapsed();

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::debug!("<- {} ({}ms)", status, duration.as_millis());

        Response::new(status, headers, body, duration)
    }
}
