//! 尾部块编解码。
//!
//! 尾部块固定 1024 字节，紧跟在负载之后（偏移 = `initial_size`）。块长固定，
//! 所以更新进度时负载的位置不会移动。块内布局（大端）：
//!
//! | 字段 | 长度 |
//! |------|------|
//! | 魔数 `MWDT` | 4 |
//! | 版本 | 2 |
//! | 标志位（bit0 = done） | 1 |
//! | 保留 | 1 |
//! | initial_size | 8 |
//! | last_byte | 8 |
//! | block_size | 8 |
//! | URL 长度 | 2 |
//! | URL（UTF-8） | 变长 |
//! | SHA-256（覆盖以上全部字节） | 32 |
//! | 零填充 | 其余 |

use bytes::{Buf, BufMut, BytesMut};
use sha2::{Digest, Sha256};

use crate::internal::metadata::structs::{DownloadMetadata, MetadataError};

/// 尾部块大小（字节）
pub const TRAILER_SIZE: usize = 1024;

/// 当前写入的记录格式版本
pub const TRAILER_VERSION: u16 = 1;

const MAGIC: &[u8; 4] = b"MWDT";
const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 8 + 8 + 2;
const DIGEST_LEN: usize = 32;
const FLAG_DONE: u8 = 0b0000_0001;

/// 可写入尾部块的最大 URL 字节数
pub const MAX_URL_LEN: usize = TRAILER_SIZE - HEADER_LEN - DIGEST_LEN;

/// 把元数据编码为固定长度的尾部块。
///
/// URL 放不下时返回 [`MetadataError::UrlTooLong`]，不会截断。
pub fn encode_trailer(
    metadata: &DownloadMetadata,
) -> Result<[u8; TRAILER_SIZE], MetadataError> {
    metadata.validate()?;

    let url = metadata.source_url.as_bytes();
    if url.len() > MAX_URL_LEN {
        return Err(MetadataError::UrlTooLong {
            len: url.len(),
            max: MAX_URL_LEN,
        });
    }

    let mut record = BytesMut::with_capacity(TRAILER_SIZE);
    record.put_slice(MAGIC);
    record.put_u16(TRAILER_VERSION);
    record.put_u8(if metadata.done { FLAG_DONE } else { 0 });
    record.put_u8(0);
    record.put_u64(metadata.initial_size);
    record.put_u64(metadata.last_byte);
    record.put_u64(metadata.block_size);
    record.put_u16(url.len() as u16);
    record.put_slice(url);

    let digest = Sha256::digest(&record);
    record.put_slice(&digest);

    let mut block = [0u8; TRAILER_SIZE];
    block[..record.len()].copy_from_slice(&record);
    Ok(block)
}

/// 解析尾部块，任何不一致都返回对应的 [`MetadataError`]。
pub fn decode_trailer(block: &[u8]) -> Result<DownloadMetadata, MetadataError> {
    if block.len() != TRAILER_SIZE {
        return Err(MetadataError::BlockLength {
            expected: TRAILER_SIZE,
            actual: block.len(),
        });
    }

    let mut cursor = block;
    if &cursor[..MAGIC.len()] != MAGIC {
        return Err(MetadataError::BadMagic);
    }
    cursor.advance(MAGIC.len());

    let version = cursor.get_u16();
    if version != TRAILER_VERSION {
        return Err(MetadataError::UnsupportedVersion(version));
    }

    let flags = cursor.get_u8();
    let reserved = cursor.get_u8();
    let initial_size = cursor.get_u64();
    let last_byte = cursor.get_u64();
    let block_size = cursor.get_u64();
    let url_len = cursor.get_u16() as usize;
    if url_len > MAX_URL_LEN {
        return Err(MetadataError::UrlLength(url_len));
    }

    let record_len = HEADER_LEN + url_len;
    let digest = &block[record_len..record_len + DIGEST_LEN];
    if Sha256::digest(&block[..record_len]).as_slice() != digest {
        return Err(MetadataError::DigestMismatch);
    }
    if block[record_len + DIGEST_LEN..].iter().any(|b| *b != 0) {
        return Err(MetadataError::DirtyPadding);
    }
    if flags & !FLAG_DONE != 0 || reserved != 0 {
        return Err(MetadataError::Invariant("未知的标志位"));
    }

    let source_url = std::str::from_utf8(&block[HEADER_LEN..record_len])?;

    let metadata = DownloadMetadata {
        source_url: source_url.to_string(),
        initial_size,
        last_byte,
        block_size,
        done: flags & FLAG_DONE != 0,
    };
    metadata.validate()?;
    Ok(metadata)
}
