//! 下载会话
//!
//! 把探测、工作文件、尾部元数据与分块拉取组合成可断点续传的下载流程。
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! # use mwd::session::DownloadSession;
//! # async fn example() -> Result<(), mwd::SessionError> {
//! let outcome = DownloadSession::new("https://example.com/movie.mp4", "movie.mp4")
//!     .block_size(8 * 1024 * 1024)
//!     .with_event_fn(|event| println!("{:?}", event))
//!     .start()
//!     .await?;
//! println!("已保存到 {}", outcome.final_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## 流程
//!
//! 1. 探测：HEAD `bytes=0-1`，得到文件大小与 Range 支持情况
//! 2. 打开工作文件：`<目标>.mwd` 不存在则新建，存在则读取尾部元数据
//! 3. 元数据损坏（或与探测结果不一致）时从 0 重新开始
//! 4. 逐块拉取：写入负载后立即更新尾部元数据，作为续传检查点
//! 5. 截掉尾部块、关闭文件，再去掉 `.mwd` 后缀
//!
//! 任一步骤失败都会释放文件句柄并返回错误，不做自动重试；再次运行同一会话即可从最后一个检查点继续。

mod fetch;
mod finalize;
mod prepare;
mod probe;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::internal::http::structs::ReqwestTransport;
use crate::internal::http::traits::HttpTransport;
use crate::internal::metadata::functions::MAX_URL_LEN;
use crate::internal::metadata::structs::MetadataError;
use crate::internal::session::functions::{final_file_path, work_file_path};
use crate::internal::session::traits::SessionObserver;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;
use crate::internal::storage::structs::TokioStorage;
use crate::internal::storage::traits::StorageAdapter;

use super::download_progress::DownloadProgress;
use super::observer_adapters::{ChannelObserver, EventFnObserver};
use super::observers_container::SessionObservers;
use super::session_config::SessionConfig;
use super::session_error::{FsOp, SessionError};
use super::session_event::SessionEvent;
use super::session_outcome::SessionOutcome;
use super::session_state::SessionState;

/// 单文件下载会话。
///
/// 会话独占工作文件句柄，同一个工作文件不要同时运行多个会话。
/// 拥有两个响应式属性：[`state`](Self::state) 与 [`progress`](Self::progress)。
pub struct DownloadSession {
    url: String,
    destination: PathBuf,
    config: SessionConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    storage: Arc<dyn StorageAdapter>,
    observers: SessionObservers,
    state: UnlockReactiveProperty<SessionState>,
    progress: UnlockReactiveProperty<DownloadProgress>,
}

impl DownloadSession {
    /// `destination` 为最终文件路径；传入已带 `.mwd` 后缀的路径表示从该工作文件续传。
    pub fn new(url: impl Into<String>, destination: impl AsRef<Path>) -> Self {
        Self {
            url: url.into(),
            destination: destination.as_ref().to_path_buf(),
            config: SessionConfig::default(),
            transport: None,
            storage: Arc::new(TokioStorage),
            observers: SessionObservers::default(),
            state: UnlockReactiveProperty::new(SessionState::Init),
            progress: UnlockReactiveProperty::new(DownloadProgress::default()),
        }
    }

    /// 设置分块大小（字节）；续传时也会替换元数据里记录的值。
    pub fn block_size(mut self, bytes: u64) -> Self {
        self.config.block_size = Some(bytes);
        self
    }

    /// 每个检查点后是否 `sync_data`，默认开启。
    pub fn sync_checkpoints(mut self, enabled: bool) -> Self {
        self.config.sync_checkpoints = enabled;
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// 替换传输层；不设置时使用默认的 [`ReqwestTransport`]。
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 替换存储实现，默认 [`TokioStorage`]。
    pub fn storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = storage;
        self
    }

    /// 注册观察者；可多次调用，按注册顺序通知。
    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observers.add(observer);
        self
    }

    /// 注册闭包观察者。
    pub fn with_event_fn<F>(mut self, f: F) -> Self
    where
        F: FnMut(&SessionEvent) + Send + Sync + 'static,
    {
        self.observers.add(EventFnObserver(f));
        self
    }

    /// 返回一个接收全部事件的通道。
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (observer, receiver) = ChannelObserver::new();
        self.observers.add(observer);
        receiver
    }

    /// 会话状态；返回可共享句柄，`.watch()` 后监听变化。
    pub fn state(&self) -> UnlockReactiveProperty<SessionState> {
        self.state.clone()
    }

    /// 下载进度；每个检查点之后更新一次。
    pub fn progress(&self) -> UnlockReactiveProperty<DownloadProgress> {
        self.progress.clone()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 下载过程中使用的 `.mwd` 路径
    pub fn work_file_path(&self) -> PathBuf {
        work_file_path(&self.destination)
    }

    /// 完成后的文件路径
    pub fn final_path(&self) -> PathBuf {
        final_file_path(&self.work_file_path())
    }

    /// 执行下载，直到完成或出错。
    pub async fn start(mut self) -> Result<SessionOutcome, SessionError> {
        match self.run().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(url = %self.url, error = %err, "下载会话失败");
                self.set_state(SessionState::Error);
                self.emit(SessionEvent::Error {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run(&mut self) -> Result<SessionOutcome, SessionError> {
        self.check_config()?;

        let work_path = self.work_file_path();
        info!(url = %self.url, work_file = %work_path.display(), "开始下载");
        self.emit(SessionEvent::Start {
            url: self.url.clone(),
            work_file: work_path.clone(),
        });

        // ──── 探测 ────
        self.set_state(SessionState::Probing);
        let transport = self.resolve_transport()?;
        let probe = self.probe(&transport).await?;

        // 新下载在创建工作文件之前判断；续传要等读出检查点之后
        let resuming = self
            .storage
            .exists(&work_path)
            .await
            .map_err(SessionError::fs(FsOp::Stat, &work_path))?;
        if !resuming {
            Self::check_range_support(
                &probe,
                0,
                probe.file_size,
                self.config.effective_block_size(),
            )?;
        }

        // ──── 工作文件与元数据 ────
        self.set_state(SessionState::OpeningFile);
        let mut work_file = self.open_work_file(&work_path).await?;
        let mut metadata = self.prepare_metadata(&mut work_file, &probe).await?;
        Self::check_range_support(
            &probe,
            metadata.last_byte,
            metadata.remaining(),
            metadata.block_size,
        )?;
        let resumed_from = metadata.last_byte;

        let _ = self.progress.update(DownloadProgress::new(
            metadata.last_byte,
            metadata.initial_size,
        ));
        self.emit(SessionEvent::DownloadBegin {
            file_size: metadata.initial_size,
            last_byte: metadata.last_byte,
        });

        // ──── 分块拉取 ────
        self.set_state(SessionState::Fetching);
        self.fetch_blocks(&transport, &mut work_file, &mut metadata)
            .await?;
        self.emit(SessionEvent::DownloadEnd);

        // ──── 收尾 ────
        self.set_state(SessionState::Finalizing);
        let final_path = self.finalize(work_file, &metadata).await?;

        info!(path = %final_path.display(), size = metadata.initial_size, "下载完成");
        self.set_state(SessionState::Done);
        self.emit(SessionEvent::Done);

        Ok(SessionOutcome {
            final_path,
            file_size: metadata.initial_size,
            resumed_from,
        })
    }

    /// 在发出任何请求之前拒绝无法完成的配置。
    fn check_config(&self) -> Result<(), SessionError> {
        if self.config.block_size == Some(0) {
            return Err(SessionError::InvalidConfig(
                "分块大小必须大于 0".to_string(),
            ));
        }
        if self.destination.file_name().is_none() {
            return Err(SessionError::InvalidConfig(format!(
                "目标路径没有文件名: {}",
                self.destination.display()
            )));
        }
        if self.url.len() > MAX_URL_LEN {
            return Err(SessionError::MetadataEncode(MetadataError::UrlTooLong {
                len: self.url.len(),
                max: MAX_URL_LEN,
            }));
        }
        Ok(())
    }

    fn resolve_transport(&self) -> Result<Arc<dyn HttpTransport>, SessionError> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => Ok(Arc::new(ReqwestTransport::new()?)),
        }
    }

    fn set_state(&self, state: SessionState) {
        let _ = self.state.update(state);
    }

    fn emit(&mut self, event: SessionEvent) {
        self.observers.emit(&event);
    }
}
