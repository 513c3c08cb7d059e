/// 探测结果：文件总大小，以及服务器是否声明支持字节范围请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub file_size: u64,
    pub accepts_ranges: bool,
}
