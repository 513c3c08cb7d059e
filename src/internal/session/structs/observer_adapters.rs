//! 观察者适配器：把闭包或通道包装成 [`SessionObserver`]。

use tokio::sync::mpsc;

use crate::internal::session::traits::SessionObserver;

use super::session_event::SessionEvent;

/// 闭包观察者，供 `with_event_fn` 使用。
pub struct EventFnObserver<F>(pub F);

impl<F> SessionObserver for EventFnObserver<F>
where
    F: FnMut(&SessionEvent) + Send + Sync,
{
    fn on_event(&mut self, event: &SessionEvent) {
        (self.0)(event);
    }
}

/// 通道观察者：把每个事件发送到无界通道，供其他任务消费。接收端关闭后静默丢弃。
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SessionObserver for ChannelObserver {
    fn on_event(&mut self, event: &SessionEvent) {
        let _ = self.sender.send(event.clone());
    }
}
