//! 收尾：截掉尾部块，关闭文件，去掉后缀。

use std::path::PathBuf;

use tracing::warn;

use crate::internal::metadata::structs::DownloadMetadata;
use crate::internal::session::functions::final_file_path;

use super::super::session_error::{FsOp, SessionError};
use super::super::session_event::SessionEvent;
use super::super::work_file::WorkFile;
use super::DownloadSession;

impl DownloadSession {
    /// 返回最终路径。目标已存在时返回 [`SessionError::NameCollision`]，工作文件保留完整负载。
    pub(super) async fn finalize(
        &mut self,
        mut work_file: WorkFile,
        metadata: &DownloadMetadata,
    ) -> Result<PathBuf, SessionError> {
        work_file.truncate(metadata.initial_size).await?;
        self.emit(SessionEvent::Truncated);

        let work_path = work_file.path().to_path_buf();
        work_file.close().await?;

        let target = final_file_path(&work_path);
        let exists = self
            .storage
            .exists(&target)
            .await
            .map_err(SessionError::fs(FsOp::Stat, &target))?;
        if exists {
            let err = SessionError::NameCollision {
                work_file: work_path,
                target,
            };
            warn!(error = %err, "无法重命名工作文件");
            self.emit(SessionEvent::RenameError {
                message: err.to_string(),
            });
            return Err(err);
        }

        if let Err(source) = self.storage.rename(&work_path, &target).await {
            let err = SessionError::FileSystem {
                op: FsOp::Rename,
                path: work_path,
                source,
            };
            self.emit(SessionEvent::RenameError {
                message: err.to_string(),
            });
            return Err(err);
        }

        self.emit(SessionEvent::Renamed {
            old_name: work_path,
            new_name: target.clone(),
        });
        Ok(target)
    }
}
