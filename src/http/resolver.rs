use std::borrow::Cow;

use crate::config::{Config, RequestTemplate};
use crate::http::request::{RequestBody, ResolvedRequest};
use crate::http::types::Method;
use crate::variable::{VariableContext, VariableResolver};
use crate::{ChainpostError, Result};

/// 构建步骤的有效变量上下文
///
/// 步骤变量基于执行前的全局上下文替换，再叠加到全局上下文的副本上；
/// 全局上下文本身不会被修改。没有步骤变量时直接借用全局上下文。
pub fn step_context<'a>(
    global: &'a VariableContext,
    variables: &[(String, String)],
) -> Cow<'a, VariableContext> {
    if variables.is_empty() {
        return Cow::Borrowed(global);
    }

    let resolved: Vec<(String, serde_json::Value)> = variables
        .iter()
        .map(|(name, template)| {
            let value = VariableResolver::substitute(template, global);
            (name.clone(), serde_json::Value::String(value))
        })
        .collect();

    let mut local = global.clone();
    local.extend(resolved);
    Cow::Owned(local)
}

/// 请求解析器：模板 + 变量 + 配置中的公共设置 → 可执行请求
pub struct RequestResolver<'a> {
    config: &'a Config,
}

impl<'a> RequestResolver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// 按名称查找模板并解析
    pub fn resolve_named(&self, name: &str, context: &VariableContext) -> Result<ResolvedRequest> {
        let template = self.config.request(name)?;
        self.resolve(template, context)
    }

    pub fn resolve(
        &self,
        template: &RequestTemplate,
        context: &VariableContext,
    ) -> Result<ResolvedRequest> {
        let method: Method = template.method.parse()?;

        let url = VariableResolver::substitute_url(&template.url, context);
        let url = self.absolute_url(&url);
        url::Url::parse(&url)
            .map_err(|e| ChainpostError::Config(format!("invalid URL '{}': {}", url, e)))?;

        let mut request = ResolvedRequest::new(method, url);

        // 1. 公共 headers
        if !template.no_headers {
            for (key, value) in &self.config.headers {
                request.set_header(key, &VariableResolver::resolve_env_vars(value));
            }
        }

        // 2. 认证信息
        if !template.no_auth {
            let auth = &self.config.auth;
            if let Some(username) = auth.username.as_deref().filter(|u| !u.is_empty()) {
                let password = auth.password.as_deref().unwrap_or_default();
                request = request.with_basic_auth(
                    &VariableResolver::resolve_env_vars(username),
                    &VariableResolver::resolve_env_vars(password),
                );
            }
            if let Some(cookie) = auth.cookie.as_deref().filter(|c| !c.is_empty()) {
                request.set_header("Cookie", &VariableResolver::resolve_env_vars(cookie));
            }
        }

        // 3. 模板 headers，每行独立替换，后写入的覆盖先写入的
        for line in &template.headers {
            let line = VariableResolver::substitute(line, context);
            if !request.set_header_line(&line) {
                tracing::warn!("ignoring malformed header '{}'", line);
            }
        }

        // 4. body
        let body = VariableResolver::substitute(&template.body, context);
        if !body.is_empty() {
            request = request.with_body(RequestBody::parse(&body));
        }

        Ok(request)
    }

    /// 非 http 开头的 URL 拼接到 base_url 之后，两者之间恰好一个 `/`
    pub fn absolute_url(&self, url: &str) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .map(VariableResolver::resolve_env_vars)
            .unwrap_or_default();

        if url.starts_with("http") || base_url.is_empty() {
            return url.to_string();
        }

        match (base_url.ends_with('/'), url.starts_with('/')) {
            (false, false) => format!("{}/{}", base_url, url),
            (true, true) => format!("{}{}", base_url, &url[1..]),
            _ => format!("{}{}", base_url, url),
        }
    }
}
