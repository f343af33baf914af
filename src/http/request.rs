use std::fmt;
use std::path::PathBuf;

use crate::http::types::Method;

/// 请求体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    /// 发送时读取文件内容
    File(PathBuf),
}

impl RequestBody {
    /// `@path` 表示文件，其余按文本处理
    pub fn parse(body: &str) -> Self {
        match body.strip_prefix('@') {
            Some(path) if !path.trim().is_empty() => RequestBody::File(PathBuf::from(path.trim())),
            _ => RequestBody::Text(body.to_string()),
        }
    }
}

/// 完全解析后的请求，可直接交给 HTTP 客户端执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: String,
    /// 按写入顺序排列，同名（忽略大小写）只保留最后一次写入
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Basic 认证（用户名, 密码）
    pub basic_auth: Option<(String, String)>,
}

impl ResolvedRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            basic_auth: None,
        }
    }

    /// 设置 header，已存在的同名 header 会被替换
    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.headers.push((key.to_string(), value.to_string()));
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    /// 解析 "Name: Value" 形式的 header 行，没有冒号的行被忽略
    pub fn set_header_line(&mut self, line: &str) -> bool {
        match line.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.set_header(key.trim(), value.trim());
                true
            }
            _ => false,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some((username.to_string(), password.to_string()));
        self
    }

    /// 获取 header 值（忽略大小写）
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_last_write_wins() {
        let mut req = ResolvedRequest::new(Method::Get, "http://localhost/");
        req.set_header("Accept", "text/plain");
        req.set_header("X-Id", "1");
        req.set_header("accept", "application/json");

        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("ACCEPT"), Some("application/json"));
        assert_eq!(req.headers[1].0, "accept");
    }

    #[test]
    fn test_header_line() {
        let mut req = ResolvedRequest::new(Method::Get, "http://localhost/");
        assert!(req.set_header_line("Authorization: Bearer a:b"));
        assert!(!req.set_header_line("no colon here"));
        assert!(!req.set_header_line(": empty name"));

        assert_eq!(req.header("authorization"), Some("Bearer a:b"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn test_body_parse() {
        assert_eq!(
            RequestBody::parse("@data/payload.json"),
            RequestBody::File(PathBuf::from("data/payload.json"))
        );
        assert_eq!(
            RequestBody::parse(r#"{"a": 1}"#),
            RequestBody::Text(r#"{"a": 1}"#.to_string())
        );
        assert_eq!(RequestBody::parse("@"), RequestBody::Text("@".to_string()));
    }

    #[test]
    fn test_display() {
        let req = ResolvedRequest::new(Method::Post, "http://localhost/login");
        assert_eq!(req.to_string(), "POST http://localhost/login");
    }
}
