//! Single notification queue shared by every view.
//!
//! Toasts expire on their own after [`TOAST_TTL`]; banners stay until
//! dismissed. The queue never holds more than its capacity: the oldest toast
//! is evicted first, the oldest banner only when no toast is left.

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use platform_api::ApiError;
use tracing::{info, warn};

pub const TOAST_TTL: Duration = Duration::from_secs(5);
pub const DEFAULT_CAPACITY: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Toast,
    Banner,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: Kind,
    pub level: Level,
    pub message: String,
    pub raised_at: Instant,
}

impl Notification {
    fn expired(&self, now: Instant) -> bool {
        self.kind == Kind::Toast && now.duration_since(self.raised_at) >= TOAST_TTL
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match (self.kind, self.level) {
            (Kind::Banner, _) => "!!",
            (Kind::Toast, Level::Success) => "ok",
            (Kind::Toast, Level::Error) => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[derive(Debug)]
struct Queue {
    next_id: u64,
    capacity: usize,
    items: VecDeque<Notification>,
}

#[derive(Clone, Debug)]
pub struct Notifier {
    inner: Arc<Mutex<Queue>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Queue {
                next_id: 1,
                capacity: capacity.max(1),
                items: VecDeque::new(),
            })),
        }
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(Kind::Toast, Level::Success, message.into(), Instant::now())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(Kind::Toast, Level::Error, message.into(), Instant::now())
    }

    pub fn banner(&self, message: impl Into<String>) -> u64 {
        self.push(Kind::Banner, Level::Error, message.into(), Instant::now())
    }

    /// Surfaces a failed backend call: authentication problems as a banner,
    /// anything else as an error toast. Returns the text shown.
    pub fn api_error(&self, err: &ApiError, fallback: &str) -> String {
        let message = err.user_message(fallback);
        if err.is_auth() {
            self.banner(message.clone());
        } else {
            self.error(message.clone());
        }
        message
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.items.len();
        queue.items.retain(|n| n.id != id);
        queue.items.len() != before
    }

    /// Notifications still visible, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Instant::now())
    }

    pub fn active_at(&self, now: Instant) -> Vec<Notification> {
        let mut queue = self.lock();
        queue.items.retain(|n| !n.expired(now));
        queue.items.iter().cloned().collect()
    }

    /// Removes and returns everything queued, expired toasts included.
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().items.drain(..).collect()
    }

    fn push(&self, kind: Kind, level: Level, message: String, now: Instant) -> u64 {
        match level {
            Level::Success => info!(?kind, %message, "notify"),
            Level::Error => warn!(?kind, %message, "notify"),
        }
        let mut queue = self.lock();
        queue.items.retain(|n| !n.expired(now));
        while queue.items.len() >= queue.capacity {
            let victim = queue
                .items
                .iter()
                .position(|n| n.kind == Kind::Toast)
                .unwrap_or(0);
            queue.items.remove(victim);
        }
        let id = queue.next_id;
        queue.next_id += 1;
        queue.items.push_back(Notification {
            id,
            kind,
            level,
            message,
            raised_at: now,
        });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Queue> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
