use crate::config::{Config, RequestTemplate};
use crate::http::Response;
use crate::variable::{VariableCapture, stringify_value};
use serde_json::Value;

/// 把单个请求的响应写回配置
///
/// - `extract_cookie`：找到的 cookie 以 `name=value` 写入 `auth.cookie`
/// - `extract_to_config`：JSONPath 命中的值写入对应配置键
///
/// 失败只记录警告，返回配置是否被修改
pub fn apply_to_config(template: &RequestTemplate, response: &Response, config: &mut Config) -> bool {
    let mut updated = false;

    if !template.extract_to_config.is_empty() {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(document) => {
                for (key, path) in &template.extract_to_config {
                    let value = match VariableCapture::new(key.as_str(), path.as_str())
                        .capture(&document)
                    {
                        Ok(value) => stringify_value(&value),
                        Err(e) => {
                            tracing::warn!(
                                "failed to extract '{}' using path '{}': {}",
                                key,
                                path,
                                e
                            );
                            continue;
                        }
                    };

                    match config.set_value(key, value.clone()) {
                        Ok(()) => {
                            tracing::info!("Extracted '{}' to config key '{}'", value, key);
                            updated = true;
                        }
                        Err(e) => tracing::warn!("{}", e),
                    }
                }
            }
            Err(e) => {
                tracing::warn!("failed to parse response as JSON for extraction: {}", e);
            }
        }
    }

    if let Some(name) = template.extract_cookie.as_deref().filter(|n| !n.is_empty()) {
        match response.cookie(name) {
            Some(cookie) => {
                config.auth.cookie = Some(cookie);
                tracing::info!("Extracted cookie '{}' and saved to auth configuration", name);
                updated = true;
            }
            None => tracing::warn!("cookie '{}' not found in response", name),
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, SET_COOKIE};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn response(body: &str, cookies: &[&str]) -> Response {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(SET_COOKIE, cookie.parse().unwrap());
        }
        Response::new(200, headers, body.to_string(), Duration::ZERO).unwrap()
    }

    #[test]
    fn test_extract_to_config() {
        let mut template = RequestTemplate::new("POST", "/login");
        template.extract_to_config = BTreeMap::from([
            ("headers.X-Token".to_string(), "$.token".to_string()),
            ("base_url".to_string(), "$.endpoint".to_string()),
            ("auth.password".to_string(), "$.missing".to_string()),
        ]);

        let mut config = Config::default();
        let updated = apply_to_config(
            &template,
            &response(r#"{"token": "t-1", "endpoint": "http://new"}"#, &[]),
            &mut config,
        );

        assert!(updated);
        assert_eq!(config.headers["X-Token"], "t-1");
        assert_eq!(config.base_url.as_deref(), Some("http://new"));
        assert!(config.auth.password.is_none());
    }

    #[test]
    fn test_unsupported_key_and_bad_json() {
        let mut template = RequestTemplate::new("GET", "/");
        template
            .extract_to_config
            .insert("timeout".to_string(), "$.t".to_string());

        let mut config = Config::default();
        assert!(!apply_to_config(&template, &response(r#"{"t": 5}"#, &[]), &mut config));
        assert!(!apply_to_config(&template, &response("not json", &[]), &mut config));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_extract_cookie() {
        let mut template = RequestTemplate::new("POST", "/login");
        template.extract_cookie = Some("session".to_string());

        let mut config = Config::default();
        assert!(apply_to_config(
            &template,
            &response("", &["session=xyz; HttpOnly"]),
            &mut config
        ));
        assert_eq!(config.auth.cookie.as_deref(), Some("session=xyz"));

        let mut config = Config::default();
        assert!(!apply_to_config(&template, &response("", &[]), &mut config));
        assert!(config.auth.cookie.is_none());
    }
}
