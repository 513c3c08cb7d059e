//! 会话错误类型。

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::internal::http::structs::NetworkError;
use crate::internal::metadata::structs::MetadataError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),

    /// 尾部元数据无法解析；会话内部会恢复为重新下载，只有检查工作文件时才会返回给调用方
    #[error("元数据损坏: {0}")]
    CorruptMetadata(#[from] MetadataError),

    #[error("无法写入元数据: {0}")]
    MetadataEncode(#[source] MetadataError),

    #[error("{op}文件失败 {}: {source}", .path.display())]
    FileSystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("目标文件 {} 已存在，下载内容保留在 {}", .target.display(), .work_file.display())]
    NameCollision { work_file: PathBuf, target: PathBuf },

    #[error("服务器不支持 Range 请求")]
    RangeNotSupported,

    #[error("配置错误: {0}")]
    InvalidConfig(String),
}

/// 出错的文件操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Stat,
    Create,
    Open,
    Read,
    Write,
    Truncate,
    Sync,
    Close,
    Rename,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FsOp::Stat => "查询",
            FsOp::Create => "创建",
            FsOp::Open => "打开",
            FsOp::Read => "读取",
            FsOp::Write => "写入",
            FsOp::Truncate => "截断",
            FsOp::Sync => "同步",
            FsOp::Close => "关闭",
            FsOp::Rename => "重命名",
        })
    }
}

impl SessionError {
    /// 生成把 `io::Error` 包装为 [`SessionError::FileSystem`] 的闭包，配合 `map_err` 使用。
    pub(crate) fn fs(
        op: FsOp,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(io::Error) -> SessionError {
        let path = path.into();
        move |source| SessionError::FileSystem { op, path, source }
    }
}
