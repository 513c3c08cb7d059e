//! 网络相关错误类型。

use thiserror::Error;

use super::transport_response::TransportResponse;

#[derive(Debug, Error)]
pub enum NetworkError {
    /// 传输层失败（连接、读取响应体等）
    #[error("HTTP 请求失败: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 非 2xx 状态码
    #[error("HTTP 状态异常: {status_code} {status_message}")]
    Http {
        status_code: u16,
        status_message: String,
    },

    /// 响应头或响应体不符合预期
    #[error("服务器响应不符合协议: {0}")]
    Protocol(String),

    #[error("URL 格式错误: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

impl NetworkError {
    /// 非 2xx 响应转换为 [`NetworkError::Http`]。
    pub(crate) fn ensure_success(
        response: &TransportResponse,
    ) -> Result<(), NetworkError> {
        if response.status.is_success() {
            return Ok(());
        }
        Err(Self::Http {
            status_code: response.status.as_u16(),
            status_message: response
                .status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
        })
    }
}
