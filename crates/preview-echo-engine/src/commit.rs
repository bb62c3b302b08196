//! Debounced commit of editor content.
//!
//! The editor reports every change; the commit target only hears about
//! content that has been stable for the debounce interval. Time is passed
//! in by the caller so the host's clock (and tests) drive it.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::host::CommitSink;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitOptions {
    pub debounce_ms: u64,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl CommitOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Holds the latest value until it has been left alone for `interval`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    interval: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the pending value and restart the window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// The pending value, once `interval` has passed since the last push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, pushed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*pushed_at) < self.interval {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// The pending value, without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Commits editor content to a [`CommitSink`] after it settles.
#[derive(Debug)]
pub struct DebouncedCommit<S> {
    debouncer: Debouncer<String>,
    sink: S,
    last_committed: Option<String>,
}

impl<S: CommitSink> DebouncedCommit<S> {
    pub fn new(sink: S, interval: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(interval),
            sink,
            last_committed: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn on_content_changed(&mut self, content: impl Into<String>, now: Instant) {
        self.debouncer.push(content.into(), now);
    }

    /// Commit if the content has settled. Returns whether a commit happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(content) => self.commit(content),
            None => false,
        }
    }

    /// Commit pending content now, e.g. before the editor goes away.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(content) => self.commit(content),
            None => false,
        }
    }

    fn commit(&mut self, content: String) -> bool {
        if self.last_committed.as_ref() == Some(&content) {
            log::debug!("commit: content unchanged, skipping");
            return false;
        }
        match self.sink.commit(&content) {
            Ok(()) => {
                self.last_committed = Some(content);
                true
            }
            Err(err) => {
                log::warn!("commit: failed to commit editor content: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySink;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn value_is_released_after_quiet_interval() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.push("a", t0);
        assert_eq!(debouncer.poll(t0 + ms(299)), None);
        assert_eq!(debouncer.poll(t0 + ms(300)), Some("a"));
        assert_eq!(debouncer.poll(t0 + ms(900)), None);
    }

    #[test]
    fn push_restarts_the_window() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.push(1, t0);
        debouncer.push(2, t0 + ms(200));
        assert_eq!(debouncer.poll(t0 + ms(400)), None);
        assert_eq!(debouncer.poll(t0 + ms(500)), Some(2));
    }

    #[test]
    fn flush_does_not_wait() {
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.push('x', Instant::now());
        assert_eq!(debouncer.flush(), Some('x'));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn burst_of_edits_commits_once() {
        let t0 = Instant::now();
        let mut commit = DebouncedCommit::new(MemorySink::new(), DEFAULT_DEBOUNCE);
        for (i, text) in ["H", "He", "Hel", "Hell", "Hello"].iter().enumerate() {
            commit.on_content_changed(*text, t0 + ms(50 * i as u64));
            assert!(!commit.tick(t0 + ms(50 * i as u64 + 10)));
        }
        assert!(commit.tick(t0 + ms(600)));
        assert_eq!(commit.sink().commits, vec!["Hello".to_string()]);
    }

    #[test]
    fn identical_content_is_not_recommitted() {
        let t0 = Instant::now();
        let mut commit = DebouncedCommit::new(MemorySink::new(), ms(10));
        commit.on_content_changed("same", t0);
        assert!(commit.tick(t0 + ms(10)));
        commit.on_content_changed("same", t0 + ms(20));
        assert!(!commit.tick(t0 + ms(40)));
        assert_eq!(commit.sink().commits.len(), 1);
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let mut commit = DebouncedCommit::new(MemorySink::failing(), ms(10));
        commit.on_content_changed("text", Instant::now());
        assert!(!commit.flush());
        assert!(!commit.is_pending());
    }
}
