//! 存储抽象：会话需要的全部文件原语。
//!
//! 每个操作要么成功、要么返回 `io::Error`，会话按顺序逐个 await，不会并发调用同一个句柄。

use std::io;
use std::path::Path;

use async_trait::async_trait;

/// 已打开文件的句柄。
#[async_trait]
pub trait FileHandle: Send {
    /// 当前文件长度
    async fn size(&mut self) -> io::Result<u64>;

    /// 从 `offset` 读满 `buf`，不足时返回 `UnexpectedEof`。
    async fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    /// 在 `offset` 处写入全部 `data`，返回写入的字节数。
    async fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<u64>;

    /// 截断（或扩展）到 `len` 字节
    async fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// 刷新并把数据落到存储设备
    async fn sync(&mut self) -> io::Result<()>;

    /// 关闭前的收尾（刷新缓冲）。句柄本身在 drop 时释放。
    async fn close(&mut self) -> io::Result<()>;
}

#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// 新建空文件并以读写方式打开；文件已存在时失败。
    async fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;

    /// 以读写方式打开已有文件
    async fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;

    /// 以只读方式打开已有文件
    async fn open_read(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}
