//! 传输层 trait：会话只依赖这里的 HEAD / 带 Range 的 GET 两个能力。
//!
//! 默认实现为 [`ReqwestTransport`](crate::http::ReqwestTransport)。需要超时、重试、
//! 代理等策略时，实现本 trait 并通过会话的 `transport` 注入即可，会话本身不做重试。

use async_trait::async_trait;
use url::Url;

use crate::internal::http::structs::{NetworkError, TransportResponse};

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发送带 `Range` 头的 HEAD 请求，响应体为空。
    async fn head(
        &self,
        url: Url,
        range: &str,
    ) -> Result<TransportResponse, NetworkError>;

    /// 发送带 `Range` 头的 GET 请求。
    ///
    /// 成功响应的响应体超过 `limit` 字节时应返回 [`NetworkError::Protocol`]；
    /// 非 2xx 响应不读取响应体。
    async fn get(
        &self,
        url: Url,
        range: &str,
        limit: u64,
    ) -> Result<TransportResponse, NetworkError>;
}
