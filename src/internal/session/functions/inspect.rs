//! 读取工作文件中的尾部元数据，不做任何恢复。

use std::path::Path;

use crate::internal::metadata::structs::DownloadMetadata;
use crate::internal::session::structs::{SessionError, WorkFile};
use crate::internal::storage::structs::TokioStorage;
use crate::internal::storage::traits::StorageAdapter;

/// 只读打开 `.mwd` 文件并解析尾部块。元数据不可用时返回 [`SessionError::CorruptMetadata`]。
pub async fn read_work_file_metadata(
    path: impl AsRef<Path>,
) -> Result<DownloadMetadata, SessionError> {
    read_work_file_metadata_with(&TokioStorage, path.as_ref()).await
}

pub async fn read_work_file_metadata_with(
    storage: &dyn StorageAdapter,
    path: &Path,
) -> Result<DownloadMetadata, SessionError> {
    let mut work_file = WorkFile::inspect(storage, path).await?;
    let metadata = work_file.read_trailer().await?;
    work_file.close().await?;
    Ok(metadata)
}
