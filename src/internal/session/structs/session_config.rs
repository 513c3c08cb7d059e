/// 默认分块大小：4MB
pub const DEFAULT_BLOCK_SIZE: u64 = 4 * 1024 * 1024;

/// 工作文件后缀（不含点）
pub const WORK_FILE_SUFFIX: &str = "mwd";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// 每次请求的分块大小（字节）。
    ///
    /// `None` 时新下载使用 [`DEFAULT_BLOCK_SIZE`]，续传沿用元数据里记录的值；
    /// `Some` 时两种情况都使用该值。
    pub block_size: Option<u64>,
    /// 每次写入元数据后是否 `sync_data`，关闭后更快，但掉电时可能丢失最后几个检查点
    pub sync_checkpoints: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            block_size: None,
            sync_checkpoints: true,
        }
    }
}

impl SessionConfig {
    /// 新下载实际使用的分块大小
    pub fn effective_block_size(&self) -> u64 {
        self.block_size.unwrap_or(DEFAULT_BLOCK_SIZE)
    }
}
