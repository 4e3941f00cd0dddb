//! Single-threaded stand-in for the host environment's scroll and resize notifications.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use crate::foundation::core::Viewport;

type Listener<T> = Box<dyn FnMut(&T)>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Observable value stream. Listeners run synchronously on [`Signal::emit`] and must not
/// subscribe to or emit on the same signal.
pub struct Signal<T> {
    listeners: Rc<RefCell<Listeners<T>>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register `listener`; it stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Box::new(listener);
        let id = {
            let mut l = self.listeners.borrow_mut();
            let id = l.next_id;
            l.next_id += 1;
            l.entries.push((id, listener));
            id
        };
        let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.listeners);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.borrow_mut().entries.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    pub fn emit(&self, value: &T) {
        for (_, listener) in self.listeners.borrow_mut().entries.iter_mut() {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Guard for a [`Signal`] listener; unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// The page a reel is mounted into: current viewport plus scroll and resize streams.
pub struct Host {
    viewport: Cell<Viewport>,
    progress: Cell<f64>,
    /// Normalized scroll progress of the bound region.
    pub scroll: Signal<f64>,
    /// New viewport after a window resize.
    pub resize: Signal<Viewport>,
}

impl Host {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Cell::new(viewport),
            progress: Cell::new(0.0),
            scroll: Signal::new(),
            resize: Signal::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn scroll_progress(&self) -> f64 {
        self.progress.get()
    }

    /// Scroll the bound region to `progress` and notify listeners.
    pub fn scroll_to(&self, progress: f64) {
        self.progress.set(progress);
        self.scroll.emit(&progress);
    }

    /// Resize the window and notify listeners.
    pub fn resize_to(&self, viewport: Viewport) {
        self.viewport.set(viewport);
        self.resize.emit(&viewport);
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
