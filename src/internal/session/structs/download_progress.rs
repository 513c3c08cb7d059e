/// 下载进度：已落盘字节数、总大小与整数百分比。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    /// 已下载并持久化的字节数
    pub bytes_done: u64,
    /// 文件总大小（字节）
    pub total: u64,
    /// 向下取整的百分比；总大小为 0 时为 100
    pub percent: u8,
}

impl DownloadProgress {
    pub fn new(bytes_done: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (bytes_done as u128 * 100 / total as u128) as u8
        };
        Self {
            bytes_done,
            total,
            percent,
        }
    }
}
