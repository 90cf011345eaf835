//! Debounced, superseding title autocomplete.
//!
//! A [`SuggestionSession`] belongs to one text field. Every keystroke
//! restarts the quiet-period timer; only the newest input may publish a
//! candidate list, and lookups for older input are dropped silently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{SuggestionConfig, MIN_DEBOUNCE_MS};
use crate::metadata::MetadataResolver;
use crate::metrics::SUGGESTION_LOOKUPS;

/// Autocomplete state for a single title input.
///
/// Must be used from within a tokio runtime.
pub struct SuggestionSession {
    resolver: MetadataResolver,
    debounce: Duration,
    /// Sequence number of the newest input.
    latest: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    /// Title chosen from the list; re-entering it does not trigger a lookup.
    pinned: Option<String>,
    tx: watch::Sender<Vec<String>>,
}

impl SuggestionSession {
    /// Create a session; the debounce window never drops below the minimum.
    pub fn new(resolver: MetadataResolver, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            resolver,
            debounce: debounce.max(Duration::from_millis(MIN_DEBOUNCE_MS)),
            latest: Arc::new(AtomicU64::new(0)),
            pending: None,
            pinned: None,
            tx,
        }
    }

    pub fn from_config(resolver: MetadataResolver, config: &SuggestionConfig) -> Self {
        Self::new(resolver, Duration::from_millis(config.debounce_ms))
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Receiver for published candidate lists.
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.tx.subscribe()
    }

    /// The currently published candidates.
    pub fn current(&self) -> Vec<String> {
        self.tx.borrow().clone()
    }

    /// Handle a change of the input text.
    pub fn input(&mut self, text: &str) {
        let text = text.trim().to_string();
        if self.pinned.as_deref() == Some(text.as_str()) {
            return;
        }
        self.pinned = None;

        let seq = self.supersede();
        if text.is_empty() {
            self.tx.send_replace(Vec::new());
            return;
        }

        let resolver = self.resolver.clone();
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        let debounce = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != seq {
                return;
            }

            let suggestions = resolver.suggest(&text).await;

            if latest.load(Ordering::SeqCst) == seq {
                debug!("Publishing {} suggestions for '{}'", suggestions.len(), text);
                tx.send_replace(suggestions);
            } else {
                SUGGESTION_LOOKUPS.with_label_values(&["superseded"]).inc();
                debug!("Dropping stale suggestions for '{}'", text);
            }
        }));
    }

    /// Accept a suggestion: clears the list and returns the chosen title.
    pub fn select(&mut self, title: &str) -> String {
        let title = title.trim().to_string();
        self.supersede();
        self.tx.send_replace(Vec::new());
        self.pinned = Some(title.clone());
        title
    }

    /// Invalidate and cancel whatever lookup is scheduled or in flight.
    fn supersede(&mut self) -> u64 {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        seq
    }
}

impl Drop for SuggestionSession {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
