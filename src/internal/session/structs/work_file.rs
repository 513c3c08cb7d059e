//! 工作文件：负载区后紧跟 1024 字节尾部块的 `.mwd` 文件。
//!
//! 句柄由 [`WorkFile`] 独占，出错时随 drop 释放；正常结束时调用 [`WorkFile::close`] 刷新后关闭。

use std::path::{Path, PathBuf};

use crate::internal::metadata::functions::{TRAILER_SIZE, decode_trailer, encode_trailer};
use crate::internal::metadata::structs::{DownloadMetadata, MetadataError};
use crate::internal::storage::traits::{FileHandle, StorageAdapter};

use super::session_error::{FsOp, SessionError};

pub struct WorkFile {
    path: PathBuf,
    handle: Box<dyn FileHandle>,
    just_created: bool,
}

impl WorkFile {
    /// 不存在时新建空文件，存在时以读写方式打开。
    pub async fn create_or_open(
        storage: &dyn StorageAdapter,
        path: &Path,
    ) -> Result<Self, SessionError> {
        let exists = storage
            .exists(path)
            .await
            .map_err(SessionError::fs(FsOp::Stat, path))?;

        let handle = if exists {
            storage
                .open(path)
                .await
                .map_err(SessionError::fs(FsOp::Open, path))?
        } else {
            storage
                .create(path)
                .await
                .map_err(SessionError::fs(FsOp::Create, path))?
        };

        Ok(Self {
            path: path.to_path_buf(),
            handle,
            just_created: !exists,
        })
    }

    /// 以只读方式打开已有工作文件，只用于读取尾部块。
    pub async fn inspect(
        storage: &dyn StorageAdapter,
        path: &Path,
    ) -> Result<Self, SessionError> {
        let handle = storage
            .open_read(path)
            .await
            .map_err(SessionError::fs(FsOp::Open, path))?;
        Ok(Self {
            path: path.to_path_buf(),
            handle,
            just_created: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 本次会话是否新建了该文件
    pub fn just_created(&self) -> bool {
        self.just_created
    }

    pub async fn size_on_disk(&mut self) -> Result<u64, SessionError> {
        self.handle
            .size()
            .await
            .map_err(SessionError::fs(FsOp::Stat, &self.path))
    }

    /// 读取并解析文件末尾的尾部块。
    ///
    /// 文件过短、解析失败，或记录的 `initial_size` 与文件长度对不上时返回
    /// [`SessionError::CorruptMetadata`]；读取本身失败返回 [`SessionError::FileSystem`]。
    pub async fn read_trailer(&mut self) -> Result<DownloadMetadata, SessionError> {
        let size_on_disk = self.size_on_disk().await?;
        let trailer_len = TRAILER_SIZE as u64;
        if size_on_disk < trailer_len {
            return Err(MetadataError::TooShort { size_on_disk }.into());
        }

        let offset = size_on_disk - trailer_len;
        let mut block = [0u8; TRAILER_SIZE];
        self.handle
            .read_exact_at(offset, &mut block)
            .await
            .map_err(SessionError::fs(FsOp::Read, &self.path))?;

        let metadata = decode_trailer(&block)?;
        if metadata.initial_size != offset {
            return Err(MetadataError::SizeMismatch {
                recorded: metadata.initial_size,
                expected: offset,
            }
            .into());
        }
        Ok(metadata)
    }

    /// 把元数据写到 `initial_size` 偏移处；`sync` 为真时等待落盘。
    pub async fn persist_metadata(
        &mut self,
        metadata: &DownloadMetadata,
        sync: bool,
    ) -> Result<(), SessionError> {
        let block = encode_trailer(metadata).map_err(SessionError::MetadataEncode)?;
        self.handle
            .write_all_at(metadata.initial_size, &block)
            .await
            .map_err(SessionError::fs(FsOp::Write, &self.path))?;
        if sync {
            self.handle
                .sync()
                .await
                .map_err(SessionError::fs(FsOp::Sync, &self.path))?;
        }
        Ok(())
    }

    /// 在 `offset` 处写入一个数据块，返回写入的字节数。
    pub async fn write_block(&mut self, offset: u64, data: &[u8]) -> Result<u64, SessionError> {
        self.handle
            .write_all_at(offset, data)
            .await
            .map_err(SessionError::fs(FsOp::Write, &self.path))
    }

    pub async fn truncate(&mut self, len: u64) -> Result<(), SessionError> {
        self.handle
            .set_len(len)
            .await
            .map_err(SessionError::fs(FsOp::Truncate, &self.path))
    }

    /// 刷新并释放句柄。
    pub async fn close(mut self) -> Result<(), SessionError> {
        self.handle
            .close()
            .await
            .map_err(SessionError::fs(FsOp::Close, &self.path))
    }
}
