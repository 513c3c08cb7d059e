use crate::internal::session::traits::SessionObserver;

use super::session_event::SessionEvent;

/// 观察者容器：按注册顺序依次通知。
#[derive(Default)]
pub struct SessionObservers {
    observers: Vec<Box<dyn SessionObserver>>,
}

impl SessionObservers {
    /// 添加一个观察者；可多次调用。
    pub fn add(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: &SessionEvent) {
        tracing::trace!(?event, "会话事件");
        for o in self.observers.iter_mut() {
            o.on_event(event);
        }
    }
}
