//! LLM 调用相关错误类型。

use thiserror::Error;

/// LLM 调用过程中的错误枚举。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// API 返回错误（如 5xx 或业务错误）。
    #[error("api error: {0}")]
    ApiError(String),

    /// 限流（如 429）。
    #[error("rate limit: {0}")]
    RateLimit(String),

    /// 认证失败（如 401/403）。
    #[error("auth failed: {0}")]
    Auth(String),

    /// 请求参数无效。
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// 网络或连接错误。
    #[error("network error: {0}")]
    Network(String),

    /// 响应解析失败。
    #[error("parsing failed: {0}")]
    Parsing(String),

    /// The call did not finish before its deadline.
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

impl LlmError {
    /// Maps a non-success HTTP status and body to an error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth(body),
            429 => LlmError::RateLimit(body),
            400..=499 => LlmError::InvalidRequest(body),
            _ => LlmError::ApiError(body),
        }
    }
}
