use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainpostError {
    #[error("config error: {0}")]
    Config(String),

    #[error("step {step} missing 'request' field")]
    MissingRequestField { step: usize },

    #[error("chain '{0}' not found in config")]
    UnknownChain(String),

    #[error("request '{0}' not found in config")]
    UnknownRequest(String),

    #[error("unknown assertion operator '{op}' in step {step}")]
    UnknownOperator { op: String, step: usize },

    #[error("invalid status code '{code}' in step {step}")]
    InvalidStatusCode { code: String, step: usize },

    #[error("step '{request}' failed: {source}")]
    Transport {
        request: String,
        #[source]
        source: Box<ChainpostError>,
    },

    #[error("assertion {index} failed: '{left}' {op} '{right}'")]
    AssertionFailed {
        index: usize,
        left: String,
        op: String,
        right: String,
    },

    #[error("chain '{chain}' failed: {source}")]
    ChainFailed {
        chain: String,
        #[source]
        source: Box<ChainpostError>,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("{0}")]
    Other(String),
}

impl ChainpostError {
    /// 是否为配置类错误（定位到配置文件即可修复）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ChainpostError::Config(_)
                | ChainpostError::MissingRequestField { .. }
                | ChainpostError::UnknownChain(_)
                | ChainpostError::UnknownRequest(_)
                | ChainpostError::UnknownOperator { .. }
                | ChainpostError::InvalidStatusCode { .. }
        )
    }
}

impl From<anyhow::Error> for ChainpostError {
    fn from(err: anyhow::Error) -> Self {
        ChainpostError::Other(err.to_string())
    }
}

impl From<inquire::InquireError> for ChainpostError {
    fn from(err: inquire::InquireError) -> Self {
        ChainpostError::Prompt(err.to_string())
    }
}

/// Result type for chainpost crate
pub type Result<T> = std::result::Result<T, ChainpostError>;
