use std::sync::RwLock;

type Listener = Box<dyn Fn() + Send + Sync>;

/// Callbacks run when the session is rejected
#[derive(Default)]
pub(crate) struct UnauthenticatedListeners {
    listeners: RwLock<Vec<Listener>>,
}

impl UnauthenticatedListeners {
    pub fn push<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(callback));
    }

    pub fn notify(&self) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in listeners.iter() {
            listener();
        }
    }
}
