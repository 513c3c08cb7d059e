pub mod download_progress;
pub mod download_session;
pub mod observer_adapters;
pub mod observers_container;
pub mod session_config;
pub mod session_error;
pub mod session_event;
pub mod session_outcome;
pub mod session_state;
pub mod work_file;

// 重导出公共类型
pub use download_progress::DownloadProgress;
pub use download_session::DownloadSession;
pub use observer_adapters::{ChannelObserver, EventFnObserver};
pub use observers_container::SessionObservers;
pub use session_config::{SessionConfig, DEFAULT_BLOCK_SIZE, WORK_FILE_SUFFIX};
pub use session_error::{FsOp, SessionError};
pub use session_event::SessionEvent;
pub use session_outcome::SessionOutcome;
pub use session_state::SessionState;
pub use work_file::WorkFile;
