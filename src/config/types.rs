use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::{ChainpostError, Result};

fn default_method() -> String {
    "GET".to_string()
}

/// 配置中可以直接写数字或布尔值的位置，统一转换为字符串
///
/// 方便在配置中写 `right = 10` 而不是 `right = "10"`
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(String::from)
}

fn scalar_string_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(map.into_iter().map(|(k, v)| (k, v.into())).collect())
}

/// 已保存的请求模板
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestTemplate {
    #[serde(default = "default_method")]
    pub method: String,

    /// URL 模板，可以是相对 base_url 的路径
    pub url: String,

    /// Body 模板，`@path` 表示从文件读取
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// "Name: Value" 形式的 header 模板，保持原始顺序
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    /// 不使用配置中的认证信息
    #[serde(default)]
    pub no_auth: bool,

    /// 不使用配置中的公共 headers
    #[serde(default)]
    pub no_headers: bool,

    /// 从响应中提取该 cookie 写入 auth.cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_cookie: Option<String>,

    /// 配置键 → JSONPath，响应值写回配置文件
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extract_to_config: BTreeMap<String, String>,
}

impl RequestTemplate {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body: String::new(),
            headers: Vec::new(),
            no_auth: false,
            no_headers: false,
            extract_cookie: None,
            extract_to_config: BTreeMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }
}

/// 认证配置
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// 完整的 cookie 字符串，例如 `session=abc`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

impl AuthConfig {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.cookie.is_none()
    }
}

/// 断言配置（原始形式，运算符在构建链时校验）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssertionConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub left: String,
    pub op: String,
    #[serde(deserialize_with = "scalar_string")]
    pub right: String,
}

/// 链中单个步骤的配置（原始形式）
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChainStepConfig {
    /// 请求名称，对应 `[requests.<name>]`
    #[serde(default)]
    pub request: String,

    /// 变量名 → JSONPath
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extract: BTreeMap<String, String>,

    #[serde(default, rename = "assert", skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<AssertionConfig>,

    /// 仅对本步骤生效的变量
    #[serde(
        default,
        deserialize_with = "scalar_string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub variables: BTreeMap<String, String>,

    /// 状态码 → 嵌套步骤
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub on_status: BTreeMap<String, Vec<ChainStepConfig>>,
}

/// 完整的配置文件
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// 单个请求的超时时间（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// 公共 headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "AuthConfig::is_empty")]
    pub auth: AuthConfig,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, RequestTemplate>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub chains: BTreeMap<String, Vec<ChainStepConfig>>,
}

impl Config {
    /// 查找已保存的请求
    pub fn request(&self, name: &str) -> Result<&RequestTemplate> {
        self.requests
            .get(name)
            .ok_or_else(|| ChainpostError::UnknownRequest(name.to_string()))
    }

    /// 查找链的原始步骤定义
    pub fn chain_steps(&self, name: &str) -> Result<&[ChainStepConfig]> {
        self.chains
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ChainpostError::UnknownChain(name.to_string()))
    }

    pub fn has_chain(&self, name: &str) -> bool {
        self.chains.contains_key(name)
    }

    /// 保存请求模板（同名覆盖）
    pub fn save_request(&mut self, name: impl Into<String>, template: RequestTemplate) {
        self.requests.insert(name.into(), template);
    }

    /// 按点号分隔的键写入配置值
    ///
    /// 支持: `base_url`、`auth.username`、`auth.password`、`auth.cookie`、`headers.<Name>`
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match key {
            "base_url" => self.base_url = Some(value),
            "auth.username" => self.auth.username = Some(value),
            "auth.password" => self.auth.password = Some(value),
            "auth.cookie" => self.auth.cookie = Some(value),
            _ => match key.strip_prefix("headers.") {
                Some(name) if !name.is_empty() => {
                    self.headers.insert(name.to_string(), value);
                }
                _ => {
                    return Err(ChainpostError::Config(format!(
                        "unsupported config key '{}'",
                        key
                    )));
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
base_url = "http://localhost:3000"

[headers]
Accept = "application/json"

[auth]
username = "user"
password = "pass"

[requests.get_data]
method = "GET"
url = "/data"
headers = ["Authorization: Bearer {{token}}"]

[requests.login]
method = "POST"
url = "/login"
body = '{"user": "admin"}'

[[chains.flow]]
request = "get_data"
assert = [{ left = "{{count}}", op = ">=", right = 1 }]

[[chains.flow.on_status.401]]
request = "login"
extract = { token = "$.token" }

[[chains.flow.on_status.401]]
request = "get_data"
variables = { page = 2 }
"#;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.headers.get("Accept").unwrap(), "application/json");
        assert_eq!(config.auth.username.as_deref(), Some("user"));

        let login = config.request("login").unwrap();
        assert_eq!(login.method, "POST");
        assert_eq!(login.body, r#"{"user": "admin"}"#);
        assert!(!login.no_auth);

        let steps = config.chain_steps("flow").unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].assertions[0].right, "1");

        let branch = &steps[0].on_status["401"];
        assert_eq!(branch.len(), 2);
        assert_eq!(branch[0].extract["token"], "$.token");
        assert_eq!(branch[1].variables["page"], "2");
    }

    #[test]
    fn test_method_defaults_to_get() {
        let config: Config = toml::from_str(
            r#"
[requests.ping]
url = "/ping"
"#,
        )
        .unwrap();
        assert_eq!(config.request("ping").unwrap().method, "GET");
    }

    #[test]
    fn test_unknown_names() {
        let config = Config::default();
        assert!(matches!(
            config.request("nope"),
            Err(ChainpostError::UnknownRequest(_))
        ));
        assert!(matches!(
            config.chain_steps("nope"),
            Err(ChainpostError::UnknownChain(_))
        ));
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("base_url", "http://api").unwrap();
        config.set_value("auth.cookie", "session=1").unwrap();
        config.set_value("headers.X-Token", "abc").unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://api"));
        assert_eq!(config.auth.cookie.as_deref(), Some("session=1"));
        assert_eq!(config.headers["X-Token"], "abc");

        assert!(config.set_value("unknown.key", "x").is_err());
        assert!(config.set_value("headers.", "x").is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let text = toml::to_string_pretty(&config).unwrap();
        let reparsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(config, reparsed);
    }
}
