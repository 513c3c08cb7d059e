//! 分块拉取循环。

use std::sync::Arc;

use tracing::debug;

use crate::internal::http::functions::BlockFetcher;
use crate::internal::http::traits::HttpTransport;
use crate::internal::metadata::structs::DownloadMetadata;

use super::super::download_progress::DownloadProgress;
use super::super::session_error::SessionError;
use super::super::session_event::SessionEvent;
use super::super::work_file::WorkFile;
use super::DownloadSession;

impl DownloadSession {
    /// 逐块拉取直到 `done`：写负载 → 推进 `last_byte` → 写尾部块（检查点） → 通知进度。
    ///
    /// 负载写入与检查点严格先后执行，崩溃最多导致最后一个未确认的块被重新拉取。
    pub(super) async fn fetch_blocks(
        &mut self,
        transport: &Arc<dyn HttpTransport>,
        work_file: &mut WorkFile,
        metadata: &mut DownloadMetadata,
    ) -> Result<(), SessionError> {
        let fetcher = BlockFetcher::new(Arc::clone(transport));

        while let Some((start, end)) = metadata.next_range() {
            debug!(start, end, "请求数据块");
            let fetched = fetcher.fetch(&self.url, start, end).await;
            let block = match fetched {
                Ok(block) => block,
                Err(err) => {
                    self.emit(SessionEvent::RequestError {
                        message: err.to_string(),
                    });
                    return Err(err.into());
                }
            };

            let written = work_file.write_block(start, &block).await?;
            metadata.advance(written);
            work_file
                .persist_metadata(metadata, self.config.sync_checkpoints)
                .await?;

            let progress = DownloadProgress::new(metadata.last_byte, metadata.initial_size);
            debug!(
                last_byte = progress.bytes_done,
                percent = progress.percent,
                "检查点已写入"
            );
            let _ = self.progress.update(progress.clone());
            self.emit(SessionEvent::Progress(progress));
        }
        Ok(())
    }
}
