//! 探测阶段。

use std::sync::Arc;

use tracing::info;

use crate::internal::http::functions::ServerProbe;
use crate::internal::http::structs::ProbeResult;
use crate::internal::http::traits::HttpTransport;

use super::super::session_error::SessionError;
use super::super::session_event::SessionEvent;
use super::DownloadSession;

impl DownloadSession {
    pub(super) async fn probe(
        &mut self,
        transport: &Arc<dyn HttpTransport>,
    ) -> Result<ProbeResult, SessionError> {
        let result = ServerProbe::new(Arc::clone(transport))
            .probe(&self.url)
            .await;

        match result {
            Ok(probe) => {
                info!(
                    file_size = probe.file_size,
                    accepts_ranges = probe.accepts_ranges,
                    "探测完成"
                );
                self.emit(SessionEvent::Probed(probe));
                Ok(probe)
            }
            Err(err) => {
                self.emit(SessionEvent::RequestError {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// 服务器不支持 Range 时只能从 0 开始、一次请求拿完全部剩余内容。
    pub(super) fn check_range_support(
        probe: &ProbeResult,
        last_byte: u64,
        remaining: u64,
        block_size: u64,
    ) -> Result<(), SessionError> {
        if !probe.accepts_ranges && remaining > 0 && (last_byte > 0 || remaining > block_size) {
            return Err(SessionError::RangeNotSupported);
        }
        Ok(())
    }
}
