//! 基于 tokio::fs 的默认存储实现。

use std::io::{self, SeekFrom};
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::internal::storage::traits::{FileHandle, StorageAdapter};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioStorage;

#[async_trait]
impl StorageAdapter for TokioStorage {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        fs::try_exists(path).await
    }

    async fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        Ok(Box::new(TokioFileHandle { file }))
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = OpenOptions::new().read(true).write(true).open(path).await?;
        Ok(Box::new(TokioFileHandle { file }))
    }

    async fn open_read(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = File::open(path).await?;
        Ok(Box::new(TokioFileHandle { file }))
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }
}

#[derive(Debug)]
pub struct TokioFileHandle {
    file: File,
}

#[async_trait]
impl FileHandle for TokioFileHandle {
    async fn size(&mut self) -> io::Result<u64> {
        // metadata 不会等待后台写入完成，先 flush
        self.file.flush().await?;
        Ok(self.file.metadata().await?.len())
    }

    async fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.file.read_exact(buf).await?;
        Ok(())
    }

    async fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.file.write_all(data).await?;
        self.file.flush().await?;
        Ok(data.len() as u64)
    }

    async fn set_len(&mut self, len: u64) -> io::Result<()> {
        self.file.flush().await?;
        self.file.set_len(len).await
    }

    async fn sync(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.sync_data().await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.file.flush().await
    }
}
