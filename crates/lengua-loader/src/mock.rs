//! Mock source for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use lengua_core::error::LoadError;

use crate::source::ItemSource;

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
    Hang,
}

/// A canned source for exercising the loader without files or a network.
pub struct MockSource {
    name: String,
    reply: Reply,
    /// Number of fetches made.
    call_count: AtomicU32,
}

impl MockSource {
    fn with_reply(name: &str, reply: Reply) -> Self {
        Self {
            name: name.to_string(),
            reply,
            call_count: AtomicU32::new(0),
        }
    }

    /// Always returns `body`.
    pub fn with_body(name: &str, body: &str) -> Self {
        Self::with_reply(name, Reply::Body(body.to_string()))
    }

    /// Always fails with the given HTTP status.
    pub fn with_status(name: &str, status: u16) -> Self {
        Self::with_reply(name, Reply::Status(status))
    }

    /// Never answers.
    pub fn hanging(name: &str) -> Self {
        Self::with_reply(name, Reply::Hang)
    }

    /// Get the number of fetches made to this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ItemSource for MockSource {
    fn location(&self) -> String {
        format!("mock:{}", self.name)
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Status(status) => Err(LoadError::Status {
                status: *status,
                location: self.location(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(LoadError::Timeout(24 * 60 * 60))
            }
        }
    }
}
