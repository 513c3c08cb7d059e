//! 分块拉取：每次一个带 Range 的 GET，按顺序执行。

use std::sync::Arc;

use bytes::Bytes;
use reqwest::StatusCode;

use crate::internal::http::functions::cache_buster::cache_busted_url;
use crate::internal::http::structs::NetworkError;
use crate::internal::http::traits::HttpTransport;

/// 生成 Range 请求头：`bytes=start-end`，end 为闭区间上界。
pub fn range_header(start: u64, end: u64) -> String {
    format!("bytes={}-{}", start, end)
}

pub struct BlockFetcher {
    transport: Arc<dyn HttpTransport>,
}

impl BlockFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// 拉取闭区间 `[start, end]`，返回服务器给出的字节。
    ///
    /// 返回的数据可能短于请求长度，但不会为空、也不会超出请求范围。
    pub async fn fetch(
        &self,
        url: &str,
        start: u64,
        end: u64,
    ) -> Result<Bytes, NetworkError> {
        if end < start {
            return Err(NetworkError::Protocol(format!(
                "无效的字节范围 {}-{}",
                start, end
            )));
        }
        let requested = end - start + 1;

        let resp = self
            .transport
            .get(cache_busted_url(url)?, &range_header(start, end), requested)
            .await?;
        NetworkError::ensure_success(&resp)?;

        // 200 表示服务器忽略了 Range，响应体从 0 开始
        if resp.status == StatusCode::OK && start > 0 {
            return Err(NetworkError::Protocol(
                "服务器忽略了 Range 请求".to_string(),
            ));
        }

        let len = resp.body.len() as u64;
        if len > requested {
            return Err(NetworkError::Protocol(format!(
                "响应体 {} 字节超过请求范围 {} 字节",
                len, requested
            )));
        }
        if len == 0 {
            return Err(NetworkError::Protocol("服务器返回了空数据块".to_string()));
        }

        Ok(resp.body)
    }
}
