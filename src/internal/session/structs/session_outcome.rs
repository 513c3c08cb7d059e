use std::path::PathBuf;

/// 一次成功会话的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// 去掉后缀后的最终文件
    pub final_path: PathBuf,
    /// 文件大小（字节）
    pub file_size: u64,
    /// 本次从哪个偏移开始下载，新下载为 0
    pub resumed_from: u64,
}
