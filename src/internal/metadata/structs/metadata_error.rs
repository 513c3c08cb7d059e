//! 元数据编解码错误。

use std::str::Utf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("元数据块长度错误: 期望 {expected} 字节，实际 {actual} 字节")]
    BlockLength { expected: usize, actual: usize },

    #[error("文件过短，不包含元数据块（{size_on_disk} 字节）")]
    TooShort { size_on_disk: u64 },

    #[error("元数据魔数不匹配")]
    BadMagic,

    #[error("不支持的元数据版本: {0}")]
    UnsupportedVersion(u16),

    #[error("元数据中的 URL 长度越界: {0}")]
    UrlLength(usize),

    #[error("元数据中的 URL 不是合法 UTF-8: {0}")]
    InvalidUrl(#[from] Utf8Error),

    #[error("元数据校验和不匹配")]
    DigestMismatch,

    #[error("元数据填充区存在非零字节")]
    DirtyPadding,

    #[error("元数据字段不一致: {0}")]
    Invariant(&'static str),

    #[error("元数据记录的文件大小 {recorded} 与预期 {expected} 不符")]
    SizeMismatch { recorded: u64, expected: u64 },

    #[error("源 URL 过长，无法写入元数据块（{len} > {max} 字节）")]
    UrlTooLong { len: usize, max: usize },
}
