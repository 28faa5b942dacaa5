use crate::domain::model::DataEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// 串口資料事件名稱
pub const DATA_RECEIVED: &str = "onDataReceived";

pub type Listener = Arc<dyn Fn(&DataEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
}

/// Named-event listener registry shared between the reader thread and callers.
#[derive(Clone, Default)]
pub struct EventEmitter {
    inner: Arc<Mutex<Registry>>,
}

/// Handle returned by [`EventEmitter::add_listener`]. Dropping it keeps the
/// listener registered; call [`Subscription::remove`] to unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: ListenerId,
    event: String,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn remove(&self) -> bool {
        match self.registry.upgrade() {
            Some(inner) => EventEmitter { inner }.remove_listener(&self.event, self.id),
            None => false,
        }
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    // 監聽器 panic 不應讓整個註冊表失效
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_listener<F>(&self, event: &str, listener: F) -> Subscription
    where
        F: Fn(&DataEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry
            .listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(listener)));

        tracing::debug!("Listener {:?} added for '{}'", id, event);

        Subscription {
            id,
            event: event.to_string(),
            registry: Arc::downgrade(&self.inner),
        }
    }

    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut registry = self.registry();
        let Some(listeners) = registry.listeners.get_mut(event) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;

        if listeners.is_empty() {
            registry.listeners.remove(event);
        }
        if removed {
            tracing::debug!("Listener {:?} removed from '{}'", id, event);
        }
        removed
    }

    pub fn remove_all_listeners(&self, event: &str) -> usize {
        let removed = self
            .registry()
            .listeners
            .remove(event)
            .map(|listeners| listeners.len())
            .unwrap_or(0);
        tracing::debug!("Removed {} listener(s) from '{}'", removed, event);
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.registry()
            .listeners
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// 依註冊順序呼叫監聽器，回傳被呼叫的數量。
    ///
    /// The list is copied before dispatch so listeners may subscribe or
    /// unsubscribe from inside the callback; changes apply to the next emit.
    pub fn emit(&self, event: &str, payload: &DataEvent) -> usize {
        let snapshot: Vec<Listener> = match self.registry().listeners.get(event) {
            Some(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return 0,
        };

        for listener in &snapshot {
            listener(payload);
        }
        snapshot.len()
    }
}
