use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// 传输层返回的响应：状态码、响应头，以及（GET 成功时）完整响应体。
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// HEAD 或非 2xx 响应时为空
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}
