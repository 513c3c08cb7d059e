/// 会话状态（由会话内部推进，外部只读监听）
///
/// `Init → Probing → OpeningFile → (LoadingMetadata) → Fetching → Finalizing → Done`，
/// 任一状态出错都进入终态 `Error`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Probing,
    OpeningFile,
    LoadingMetadata,
    Fetching,
    Finalizing,
    Done,
    Error,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Error)
    }
}
