//! The transient status notice.
//!
//! There is one current notice. Posting replaces it and restarts the clear
//! timer; an older timer never clears a newer notice.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
    /// Neutral status.
    Info,
}

/// A short user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity, for styling.
    pub level: NoticeLevel,
    /// Message shown to the user.
    pub text: String,
}

impl Notice {
    /// A success notice.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    /// An error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    /// An informational notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    seq: u64,
    notice: Option<Notice>,
}

/// Holds the current notice and its clear timer.
#[derive(Debug)]
pub struct NoticeBoard {
    slot: Arc<watch::Sender<Slot>>,
    ttl: Duration,
    clear_task: Option<JoinHandle<()>>,
}

impl NoticeBoard {
    /// Create an empty board whose notices clear after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = watch::channel(Slot::default());
        Self {
            slot: Arc::new(tx),
            ttl,
            clear_task: None,
        }
    }

    /// Show a notice, replacing the current one and rescheduling the clear.
    ///
    /// Outside a tokio runtime the notice stays until replaced.
    pub fn post(&mut self, notice: Notice) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }

        let mut seq = 0;
        self.slot.send_modify(|slot| {
            slot.seq += 1;
            slot.notice = Some(notice);
            seq = slot.seq;
        });

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let slot = Arc::clone(&self.slot);
        let ttl = self.ttl;
        self.clear_task = Some(handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            slot.send_if_modified(|slot| {
                if slot.seq == seq && slot.notice.is_some() {
                    slot.notice = None;
                    true
                } else {
                    false
                }
            });
        }));
    }

    /// The notice currently shown, if any.
    pub fn current(&self) -> Option<Notice> {
        self.slot.borrow().notice.clone()
    }

    /// Remove the current notice now.
    pub fn clear(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
        self.slot.send_modify(|slot| slot.notice = None);
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3);

    #[tokio::test(start_paused = true)]
    async fn test_notice_clears_after_ttl() {
        let mut board = NoticeBoard::new(TTL);
        board.post(Notice::success("saved relays!"));
        assert_eq!(board.current(), Some(Notice::success("saved relays!")));

        tokio::time::sleep(TTL - Duration::from_millis(1)).await;
        assert!(board.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_reschedules() {
        let mut board = NoticeBoard::new(TTL);
        board.post(Notice::info("first"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        board.post(Notice::error("second"));

        // The first timer would have fired here.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(board.current(), Some(Notice::error("second")));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(board.current(), None);
    }

    #[test]
    fn test_post_without_runtime_persists() {
        let mut board = NoticeBoard::new(TTL);
        board.post(Notice::info("hello"));
        assert_eq!(board.current(), Some(Notice::info("hello")));
        board.clear();
        assert_eq!(board.current(), None);
    }
}
