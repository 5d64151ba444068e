use std::{future::Future, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use tokio::sync::Notify;

use crate::types::PlaylistItem;

const STATE_LENGTH: usize = 32;

/// Random alphanumeric value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Name used for the target playlist when none is given.
pub fn default_target_name(source_name: &str) -> String {
    format!("{} (reversed)", source_name)
}

/// Reverses the fetched items as they are, unresolved entries included.
pub fn reverse_items(items: &[PlaylistItem]) -> Vec<PlaylistItem> {
    items.iter().rev().cloned().collect()
}

/// Collects the URIs to write, in order, dropping entries without a
/// resolvable track. Returns the URIs and the number of dropped entries.
pub fn writable_uris(items: &[PlaylistItem]) -> (Vec<String>, usize) {
    let uris: Vec<String> = items
        .iter()
        .filter_map(|item| item.track.as_ref().and_then(|t| t.playable_uri()))
        .collect();
    let skipped = items.len() - uris.len();
    (uris, skipped)
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Installs the Ctrl-C handler and returns the signal it raises.
///
/// Each Ctrl-C stores one notification, so an interrupt that arrives between
/// two steps still stops the next one. Without a handler (signal setup failed)
/// Ctrl-C keeps its default behavior of ending the process.
pub fn interrupt_on_ctrl_c() -> Arc<Notify> {
    let interrupt = Arc::new(Notify::new());
    let notifier = Arc::clone(&interrupt);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            notifier.notify_one();
        }
    });
    interrupt
}

/// Runs `work` unless `interrupt` fires first, in which case `work` is dropped
/// and `None` is returned.
pub async fn until_interrupted<F>(interrupt: &Notify, work: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = interrupt.notified() => None,
        output = work => Some(output),
    }
}
