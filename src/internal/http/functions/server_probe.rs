//! 服务器探测：一次带 `Range: bytes=0-1` 的 HEAD 请求，得到文件大小与 Range 支持情况。

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, HeaderMap};

use crate::internal::http::functions::cache_buster::cache_busted_url;
use crate::internal::metadata::functions::TRAILER_SIZE;
use crate::internal::http::structs::{NetworkError, ProbeResult};
use crate::internal::http::traits::HttpTransport;

/// 探测请求使用的 Range
pub const PROBE_RANGE: &str = "bytes=0-1";

pub struct ServerProbe {
    transport: Arc<dyn HttpTransport>,
}

impl ServerProbe {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// 探测远程文件。非 2xx 返回 [`NetworkError::Http`]，拿不到大小返回 [`NetworkError::Protocol`]。
    pub async fn probe(&self, url: &str) -> Result<ProbeResult, NetworkError> {
        let resp = self
            .transport
            .head(cache_busted_url(url)?, PROBE_RANGE)
            .await?;
        NetworkError::ensure_success(&resp)?;

        Ok(ProbeResult {
            file_size: parse_file_size(resp.status, &resp.headers)?,
            accepts_ranges: declares_byte_ranges(resp.status, &resp.headers),
        })
    }
}

/// 工作文件末尾还要放一个尾部块，超过该值的大小无法表示
pub const MAX_FILE_SIZE: u64 = u64::MAX - TRAILER_SIZE as u64;

/// 优先取 `Content-Range` 中的总大小（`bytes 0-1/12345`），否则取 `Content-Length`。
///
/// 206 响应的 `Content-Length` 只是片段长度，此时总大小必须来自 `Content-Range`。
pub fn parse_file_size(status: StatusCode, headers: &HeaderMap) -> Result<u64, NetworkError> {
    let from_range = headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(content_range_total);

    let size = match from_range {
        Some(total) => total,
        None if status == StatusCode::PARTIAL_CONTENT => {
            return Err(NetworkError::Protocol(
                "206 响应缺少可解析的 Content-Range 总大小".to_string(),
            ));
        }
        None => headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                NetworkError::Protocol(
                    "缺少或无法解析 Content-Range / Content-Length".to_string(),
                )
            })?,
    };

    if size > MAX_FILE_SIZE {
        return Err(NetworkError::Protocol(format!(
            "文件大小 {} 超出上限 {}",
            size, MAX_FILE_SIZE
        )));
    }
    Ok(size)
}

/// `Accept-Ranges` 中列出 `bytes`，或 206 响应附带了 `Content-Range`，都视为支持字节范围。
pub fn declares_byte_ranges(status: StatusCode, headers: &HeaderMap) -> bool {
    let listed = headers
        .get_all(ACCEPT_RANGES)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|unit| unit.trim().eq_ignore_ascii_case("bytes"));

    listed
        || (status == StatusCode::PARTIAL_CONTENT
            && headers.contains_key(CONTENT_RANGE))
}

fn content_range_total(value: &str) -> Option<u64> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (range, total) = rest.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    start.trim().parse::<u64>().ok()?;
    end.trim().parse::<u64>().ok()?;
    total.trim().parse().ok()
}
