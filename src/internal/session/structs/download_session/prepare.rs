//! 打开工作文件并得到本次下载使用的元数据：续传时读取尾部块，新建或损坏时重新初始化。

use std::path::Path;

use tracing::{debug, info, warn};

use crate::internal::http::structs::ProbeResult;
use crate::internal::metadata::functions::TRAILER_SIZE;
use crate::internal::metadata::structs::{DownloadMetadata, MetadataError};

use super::super::session_error::SessionError;
use super::super::session_event::SessionEvent;
use super::super::session_state::SessionState;
use super::super::work_file::WorkFile;
use super::DownloadSession;

impl DownloadSession {
    pub(super) async fn open_work_file(&mut self, path: &Path) -> Result<WorkFile, SessionError> {
        let mut work_file = WorkFile::create_or_open(self.storage.as_ref(), path).await?;
        let size = work_file.size_on_disk().await?;
        let path = work_file.path().to_path_buf();

        if work_file.just_created() {
            debug!(path = %path.display(), "新建工作文件");
            self.emit(SessionEvent::FileCreated {
                path: path.clone(),
                size,
            });
        }
        self.emit(SessionEvent::FileLoaded {
            path,
            size,
            already_existed: !work_file.just_created(),
        });
        Ok(work_file)
    }

    pub(super) async fn prepare_metadata(
        &mut self,
        work_file: &mut WorkFile,
        probe: &ProbeResult,
    ) -> Result<DownloadMetadata, SessionError> {
        if work_file.just_created() {
            return self.init_metadata(work_file, probe, false).await;
        }

        self.set_state(SessionState::LoadingMetadata);
        let loaded = self.load_metadata(work_file, probe).await;
        match loaded {
            Ok(metadata) => {
                info!(
                    last_byte = metadata.last_byte,
                    initial_size = metadata.initial_size,
                    "从检查点续传"
                );
                Ok(self.apply_block_size(metadata))
            }
            Err(SessionError::CorruptMetadata(reason)) => {
                warn!(error = %reason, "工作文件元数据不可用，从头下载");
                self.emit(SessionEvent::CorruptedMetadata {
                    reason: reason.to_string(),
                });
                self.init_metadata(work_file, probe, true).await
            }
            Err(err) => Err(err),
        }
    }

    async fn load_metadata(
        &self,
        work_file: &mut WorkFile,
        probe: &ProbeResult,
    ) -> Result<DownloadMetadata, SessionError> {
        let metadata = work_file.read_trailer().await?;
        if metadata.initial_size != probe.file_size {
            return Err(MetadataError::SizeMismatch {
                recorded: metadata.initial_size,
                expected: probe.file_size,
            }
            .into());
        }
        Ok(metadata)
    }

    /// 从 0 开始的新元数据，离开本阶段前先写入尾部块。
    async fn init_metadata(
        &mut self,
        work_file: &mut WorkFile,
        probe: &ProbeResult,
        corrupted_metadata: bool,
    ) -> Result<DownloadMetadata, SessionError> {
        let metadata = DownloadMetadata::fresh(
            self.url.clone(),
            probe.file_size,
            self.config.effective_block_size(),
        );

        // 旧文件可能比新布局长，多出的字节会让下次续传找错尾部块
        if corrupted_metadata {
            work_file
                .truncate(metadata.initial_size + TRAILER_SIZE as u64)
                .await?;
        }
        work_file
            .persist_metadata(&metadata, self.config.sync_checkpoints)
            .await?;

        self.emit(SessionEvent::MetadataCreated {
            corrupted_metadata,
            metadata: metadata.clone(),
        });
        Ok(metadata)
    }

    /// 显式配置的分块大小优先于记录值，从下一个检查点起写入。
    fn apply_block_size(&self, mut metadata: DownloadMetadata) -> DownloadMetadata {
        if let Some(block_size) = self.config.block_size
            && block_size != metadata.block_size
        {
            debug!(
                recorded = metadata.block_size,
                configured = block_size,
                "替换分块大小"
            );
            metadata.block_size = block_size;
        }
        metadata
    }
}
