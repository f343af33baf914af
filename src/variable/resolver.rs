use crate::variable::types::{VariableContext, stringify_value};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::form_urlencoded;
use uuid::Uuid;

// 变量名不含空白和花括号，`$` 开头的留给动态变量
static VAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^{}\s$][^{}\s]*)\}\}").unwrap());
static DYNAMIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\$(timestamp|uuid)\}\}").unwrap());
static ENV_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// 替换值写入目标文本时的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 原样写入（body、header、断言）
    Plain,
    /// 按 URL query 组件编码（URL）
    Query,
}

impl Encoding {
    fn apply(self, value: &str) -> String {
        match self {
            Encoding::Plain => value.to_string(),
            Encoding::Query => form_urlencoded::byte_serialize(value.as_bytes()).collect(),
        }
    }
}

/// 变量替换器
pub struct VariableResolver;

impl VariableResolver {
    /// 替换文本中的所有 {{variable}} 占位符（原样写入）
    pub fn substitute(text: &str, context: &VariableContext) -> String {
        Self::substitute_with(text, context, Encoding::Plain)
    }

    /// 替换 URL 模板，变量值按 query 组件编码
    pub fn substitute_url(text: &str, context: &VariableContext) -> String {
        Self::substitute_with(text, context, Encoding::Query)
    }

    /// 先展开内置动态变量，再替换上下文中的变量
    ///
    /// 未定义的变量保持原样
    pub fn substitute_with(text: &str, context: &VariableContext, encoding: Encoding) -> String {
        let with_dynamic = Self::expand_dynamic(text, encoding);

        VAR_REGEX
            .replace_all(&with_dynamic, |caps: &Captures| match context.get(&caps[1]) {
                Some(value) => encoding.apply(&stringify_value(value)),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// 展开 {{$timestamp}} 和 {{$uuid}}，每次出现都重新生成
    fn expand_dynamic(text: &str, encoding: Encoding) -> String {
        DYNAMIC_REGEX
            .replace_all(text, |caps: &Captures| {
                let value = match &caps[1] {
                    "timestamp" => chrono::Utc::now().timestamp().to_string(),
                    _ => Uuid::new_v4().simple().to_string(),
                };
                encoding.apply(&value)
            })
            .into_owned()
    }

    /// 解析并替换系统环境变量 ${VAR}
    pub fn resolve_env_vars(text: &str) -> String {
        ENV_REGEX
            .replace_all(text, |caps: &Captures| {
                let env_name = &caps[1];
                std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned()
    }
}
