//! 会话通知。

use std::path::PathBuf;

use crate::internal::http::structs::ProbeResult;
use crate::internal::metadata::structs::DownloadMetadata;

use super::download_progress::DownloadProgress;

/// 会话按以下顺序发出通知：
///
/// `Start → Probed → (FileCreated) → FileLoaded → (CorruptedMetadata) → (MetadataCreated)
/// → DownloadBegin → Progress* → DownloadEnd → Truncated → Renamed → Done`
///
/// 失败时依次发出 `RequestError`（网络错误）或 `RenameError`（重命名失败），最后是 `Error`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start {
        url: String,
        work_file: PathBuf,
    },
    Probed(ProbeResult),
    /// 工作文件不存在，已新建空文件
    FileCreated {
        path: PathBuf,
        size: u64,
    },
    FileLoaded {
        path: PathBuf,
        size: u64,
        already_existed: bool,
    },
    /// 已有工作文件的尾部元数据无法使用，将从头下载
    CorruptedMetadata {
        reason: String,
    },
    MetadataCreated {
        corrupted_metadata: bool,
        metadata: DownloadMetadata,
    },
    DownloadBegin {
        file_size: u64,
        last_byte: u64,
    },
    Progress(DownloadProgress),
    DownloadEnd,
    /// 尾部元数据已截掉
    Truncated,
    Renamed {
        old_name: PathBuf,
        new_name: PathBuf,
    },
    Done,
    RequestError {
        message: String,
    },
    RenameError {
        message: String,
    },
    Error {
        message: String,
    },
}
