use serde_json::Value;
use std::collections::HashMap;

/// 变量上下文，存储链执行过程中的所有变量
///
/// 值保留 JSON 类型（字符串、数字、布尔、对象、数组），
/// 替换模板时再转换为字符串。
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    /// 变量映射表
    variables: HashMap<String, Value>,
}

impl VariableContext {
    /// 创建新的空变量上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入变量（已存在则覆盖）
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    /// 获取原始 JSON 值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// 获取变量的字符串形式
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.variables.get(key).map(stringify_value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// 批量插入变量
    pub fn extend<I, K>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.variables
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v)));
    }

    /// 变量数量
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// 按名称排序的变量名列表
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// 把 JSON 值转换为模板中使用的字符串
///
/// 字符串原样输出（不带引号），其余类型使用紧凑 JSON 文本
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
