use crate::Result;
use crate::http::types::Status;
use cookie::Cookie;
use reqwest::header::{HeaderMap as Headers, SET_COOKIE};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: String, duration: Duration) -> Result<Self> {
        Ok(Self {
            status: Status::new(status)?,
            headers,
            body,
            duration,
        })
    }

    /// 解析所有 Set-Cookie 头，无法解析的条目被跳过
    pub fn cookies(&self) -> impl Iterator<Item = Cookie<'_>> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse(v).ok())
    }

    /// 查找 Set-Cookie 中的指定 cookie，返回 `name=value`（去掉值两侧的引号）
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies()
            .find(|c| c.name() == name)
            .map(|c| format!("{}={}", c.name(), c.value_trimmed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cookies(values: &[&str]) -> Response {
        let mut headers = Headers::new();
        for value in values {
            headers.append(SET_COOKIE, value.parse().unwrap());
        }
        Response::new(200, headers, String::new(), Duration::ZERO).unwrap()
    }

    #[test]
    fn test_cookie_lookup() {
        let response = with_cookies(&["theme=dark; Path=/", "session=abc123; HttpOnly; Secure"]);

        assert_eq!(response.cookie("session"), Some("session=abc123".to_string()));
        assert_eq!(response.cookie("theme"), Some("theme=dark".to_string()));
        assert_eq!(response.cookie("missing"), None);
    }

    #[test]
    fn test_cookie_quoted_value() {
        let response = with_cookies(&[r#"session="abc"; Path=/"#]);
        assert_eq!(response.cookie("session"), Some("session=abc".to_string()));
    }

    #[test]
    fn test_cookie_skips_malformed_entries() {
        let response = with_cookies(&["garbage", "token=t1; Max-Age=60"]);

        assert_eq!(response.cookies().count(), 1);
        assert_eq!(response.cookie("token"), Some("token=t1".to_string()));
    }
}
