//! 基于 reqwest 的默认传输层。

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::{
    header::{HeaderMap, HeaderValue, RANGE, USER_AGENT},
    Client,
};
use url::Url;

use crate::internal::http::structs::{NetworkError, TransportResponse};
use crate::internal::http::traits::HttpTransport;

const DEFAULT_USER_AGENT: &str = concat!("mwd/", env!("CARGO_PKG_VERSION"));

/// reqwest 客户端封装。未开启 gzip 等透明解压，保证 Range 偏移对应原始字节。
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client, // 内部是Arc，clone 开销很小
}

impl ReqwestTransport {
    /// 创建默认客户端
    pub fn new() -> Result<Self, NetworkError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let client = Client::builder()
            .http1_only()
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// 使用调用方已配置好的客户端（代理、超时、证书等）
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn head(
        &self,
        url: Url,
        range: &str,
    ) -> Result<TransportResponse, NetworkError> {
        let resp = self.client.head(url).header(RANGE, range).send().await?;
        Ok(TransportResponse::new(
            resp.status(),
            resp.headers().clone(),
            Bytes::new(),
        ))
    }

    async fn get(
        &self,
        url: Url,
        range: &str,
        limit: u64,
    ) -> Result<TransportResponse, NetworkError> {
        let resp = self.client.get(url).header(RANGE, range).send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        if !status.is_success() {
            return Ok(TransportResponse::new(status, headers, Bytes::new()));
        }

        let mut stream = resp.bytes_stream();
        let mut body = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(NetworkError::Protocol(format!(
                    "响应体超过请求范围（{} 字节）",
                    limit
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(TransportResponse::new(status, headers, body.freeze()))
    }
}
