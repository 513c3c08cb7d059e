//! 会话观察者：接收会话按顺序发出的通知。
//!
//! 使用方式二选一（可混用）：
//! - **闭包**：通过会话的 `with_event_fn` 传入；
//! - **完整观察者**：实现本 trait，通过 `with_observer` 注册。
//!
//! 也可以调用 `subscribe()` 得到一个事件通道，在其他任务中消费。

use crate::internal::session::structs::SessionEvent;

pub trait SessionObserver: Send + Sync {
    /// 每个事件调用一次，调用顺序即事件发生顺序。不要在这里做阻塞操作。
    fn on_event(&mut self, event: &SessionEvent);
}
