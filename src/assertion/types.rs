use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,          // ==
    NotEqual,       // !=
    Greater,        // >
    Less,           // <
    GreaterOrEqual, // >=
    LessOrEqual,    // <=
}

/// 未知运算符
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid operator: {0}")]
pub struct InvalidOperator(pub String);

impl FromStr for CompareOp {
    type Err = InvalidOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            ">" => Ok(Self::Greater),
            "<" => Ok(Self::Less),
            ">=" => Ok(Self::GreaterOrEqual),
            "<=" => Ok(Self::LessOrEqual),
            other => Err(InvalidOperator(other.to_string())),
        }
    }
}

impl CompareOp {
    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }

    /// 根据两侧的排序结果判断是否成立
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::Less => ordering == Ordering::Less,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    /// 比较两个已替换的操作数
    ///
    /// 两侧都能解析为整数时按数值比较，否则按字符串比较。
    /// 浮点数不走数值比较。
    pub fn compare(&self, left: &str, right: &str) -> bool {
        let ordering = match (left.parse::<i64>(), right.parse::<i64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => left.cmp(right),
        };
        self.holds(ordering)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 断言：两侧都是模板，执行时基于当前变量替换
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    pub left: String,
    pub op: CompareOp,
    pub right: String,
}

impl Assertion {
    pub fn new(left: impl Into<String>, op: CompareOp, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            op,
            right: right.into(),
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// 断言结果
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// 断言序号（从 1 开始）
    pub index: usize,

    /// 是否通过
    pub passed: bool,

    /// 替换后的左值
    pub left: String,

    pub op: CompareOp,

    /// 替换后的右值
    pub right: String,
}
