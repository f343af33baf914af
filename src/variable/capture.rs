use crate::variable::types::VariableContext;
use jsonpath_rust::JsonPath;
use serde_json::Value;

/// 变量捕获错误
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Invalid JSONPath '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("Path not found: {0}")]
    PathNotFound(String),
}

/// 变量捕获配置：把 JSONPath 命中的值写入变量
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableCapture {
    /// 变量名称
    pub name: String,

    /// JSONPath 表达式，例如 `$.user.id`、`$.items[0].name`
    pub path: String,
}

impl VariableCapture {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// 规范化后的表达式
    ///
    /// - `$.token` → `$.token`
    /// - `user.id` → `$.user.id`
    /// - `[0].id` → `$[0].id`
    pub fn normalized_path(&self) -> String {
        let path = self.path.trim();
        if path.starts_with('$') {
            path.to_string()
        } else if path.starts_with('[') {
            format!("${}", path)
        } else {
            format!("$.{}", path)
        }
    }

    /// 在 JSON 文档上执行查询
    ///
    /// 单个命中返回该值，多个命中返回数组，无命中返回 PathNotFound
    pub fn capture(&self, document: &Value) -> Result<Value, CaptureError> {
        let path = self.normalized_path();
        let mut matches = document
            .query(&path)
            .map_err(|e| CaptureError::InvalidPath {
                path: path.clone(),
                message: e.to_string(),
            })?;

        match matches.len() {
            0 => Err(CaptureError::PathNotFound(path)),
            1 => Ok(matches.remove(0).clone()),
            _ => Ok(Value::Array(matches.into_iter().cloned().collect())),
        }
    }
}

/// 从响应 body 中提取变量写入上下文
///
/// body 不是合法 JSON 时跳过全部提取；单个路径未命中只跳过该变量。
/// 两种情况都只记录警告，返回成功写入的变量名。
pub fn capture_variables(
    request_name: &str,
    body: &str,
    captures: &[VariableCapture],
    context: &mut VariableContext,
) -> Vec<String> {
    if captures.is_empty() {
        return Vec::new();
    }

    let document: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                "failed to parse response for extraction in step '{}': {}",
                request_name,
                e
            );
            return Vec::new();
        }
    };

    let mut captured = Vec::with_capacity(captures.len());
    for capture in captures {
        match capture.capture(&document) {
            Ok(value) => {
                tracing::debug!("extracted '{}' = {}", capture.name, value);
                context.insert(capture.name.clone(), value);
                captured.push(capture.name.clone());
            }
            Err(e) => {
                tracing::warn!(
                    "failed to extract '{}' using path '{}': {}",
                    capture.name,
                    capture.path,
                    e
                );
            }
        }
    }

    captured
}
