//! 防缓存：每个请求都追加一个会变化的查询参数。

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use url::Url;

use crate::internal::http::structs::NetworkError;

/// 防缓存参数名
pub const CACHE_BUSTER_PARAM: &str = "_";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// 返回追加了 `_=<毫秒时间戳>.<序号>` 的 URL。
///
/// 同一毫秒内的多次请求靠进程内序号区分。
pub fn cache_busted_url(url: &str) -> Result<Url, NetworkError> {
    let mut url = Url::parse(url)?;
    let value = format!(
        "{}.{}",
        Utc::now().timestamp_millis(),
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    );
    url.query_pairs_mut().append_pair(CACHE_BUSTER_PARAM, &value);
    Ok(url)
}
