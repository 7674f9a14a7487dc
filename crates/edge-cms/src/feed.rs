//! Entry change notifications for live preview.

use std::sync::{Arc, Mutex, Weak};

/// An entry edited in the CMS editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryChange {
    pub content_type_uid: Option<String>,
    pub entry_uid: Option<String>,
}

type Callback = Arc<dyn Fn(&EntryChange) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Observer list for entry changes.
///
/// Subscribers re-fetch their content when notified. Each subscription is
/// removed when its [`Subscription`] is unsubscribed or dropped.
#[derive(Clone, Default)]
pub struct EntryChangeFeed {
    inner: Arc<Mutex<Subscribers>>,
}

impl EntryChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&EntryChange) + Send + Sync + 'static,
    {
        let id = match self.inner.lock() {
            Ok(mut subscribers) => {
                let id = subscribers.next_id;
                subscribers.next_id += 1;
                subscribers.callbacks.push((id, Arc::new(callback)));
                id
            }
            Err(_) => u64::MAX,
        };
        Subscription {
            id,
            feed: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every live subscriber. Returns how many were called.
    ///
    /// Callbacks run outside the lock, so they may subscribe or
    /// unsubscribe.
    pub fn notify(&self, change: &EntryChange) -> usize {
        let callbacks: Vec<Callback> = match self.inner.lock() {
            Ok(subscribers) => subscribers.callbacks.iter().map(|(_, cb)| cb.clone()).collect(),
            Err(_) => return 0,
        };
        for callback in &callbacks {
            callback(change);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().map(|s| s.callbacks.len()).unwrap_or(0)
    }
}

/// Handle for one registered callback.
pub struct Subscription {
    id: u64,
    feed: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Remove the callback from the feed.
    pub fn unsubscribe(self) {
        drop(self);
    }

    fn detach(&self) {
        if let Some(feed) = self.feed.upgrade() {
            if let Ok(mut subscribers) = feed.lock() {
                subscribers.callbacks.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
