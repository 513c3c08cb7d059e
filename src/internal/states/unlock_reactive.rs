//! # UnlockReactiveProperty
//!
//! 基于 [`tokio::sync::watch`] 的轻量响应式属性，会话用它对外暴露当前状态和下载进度。
//!
//! ## 使用示例
//! ```rust,no_run
//! use mwd::states::unlock_reactive::UnlockReactiveProperty;
//!
//! let prop = UnlockReactiveProperty::new(0u64);
//! prop.update(1024).unwrap();
//! ```

pub use super::reactive_core::{PropertyWatcher, ReactivePropertyError as UnlockReactivePropertyError};

/// 轻量级响应式属性容器。
///
/// 读写不阻塞，只保留最新值，适合进度这类高频更新；需要完整事件序列时请使用会话的观察者。
pub type UnlockReactiveProperty<T> = super::reactive_core::ReactiveProperty<T>;
