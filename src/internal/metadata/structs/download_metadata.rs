//! 断点元数据：写在未完成文件末尾的下载进度记录。

use super::metadata_error::MetadataError;

/// 下载进度记录，持久化在工作文件（`.mwd`）负载之后的尾部块中。
///
/// 字段之间满足以下约束，[`DownloadMetadata::validate`] 会逐项检查：
/// - `last_byte <= initial_size`
/// - `done == (last_byte == initial_size)`
/// - `block_size > 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadMetadata {
    /// 源文件 URL
    pub source_url: String,
    /// 负载总字节数（探测得到），同时也是尾部块在文件中的偏移
    pub initial_size: u64,
    /// 下一次写入的偏移，即已落盘的字节数
    pub last_byte: u64,
    /// 每次请求的分块大小（字节）
    pub block_size: u64,
    /// 是否已全部下载
    pub done: bool,
}

impl DownloadMetadata {
    /// 新建一份从 0 开始的进度记录；总大小为 0 时直接视为完成。
    pub fn fresh(
        source_url: impl Into<String>,
        initial_size: u64,
        block_size: u64,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            initial_size,
            last_byte: 0,
            block_size,
            done: initial_size == 0,
        }
    }

    /// 校验字段约束。
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.block_size == 0 {
            return Err(MetadataError::Invariant("block_size 为 0"));
        }
        if self.last_byte > self.initial_size {
            return Err(MetadataError::Invariant("last_byte 超过 initial_size"));
        }
        if self.done != (self.last_byte == self.initial_size) {
            return Err(MetadataError::Invariant("done 与 last_byte 不一致"));
        }
        Ok(())
    }

    /// 下一个待请求的闭区间 `[start, end]`；已完成时返回 `None`。
    pub fn next_range(&self) -> Option<(u64, u64)> {
        if self.done || self.last_byte >= self.initial_size {
            return None;
        }
        let end = self
            .last_byte
            .saturating_add(self.block_size)
            .min(self.initial_size);
        Some((self.last_byte, end - 1))
    }

    /// 按实际写入的字节数推进进度，并重新计算 `done`。
    pub fn advance(&mut self, written: u64) {
        self.last_byte = self
            .last_byte
            .saturating_add(written)
            .min(self.initial_size);
        self.done = self.last_byte >= self.initial_size;
    }

    /// 剩余未下载的字节数。
    pub fn remaining(&self) -> u64 {
        self.initial_size - self.last_byte
    }
}
