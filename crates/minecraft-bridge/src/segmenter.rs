//! Reply segmentation and paced delivery
//!
//! World chat has a practical per-message length limit, so oversized
//! replies are split on word boundaries and delivered as an ordered
//! sequence: the first chunk after a short randomized delay, the rest at
//! a fixed interval under a "»" continuation marker. Each sender has at
//! most one pending chunk queue; a newer reply supersedes the old one,
//! and in-flight deliveries verify their queue generation before sending
//! so stale chunks never reach the server.

#[path = "segmenter_tests.rs"]
mod segmenter_tests;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use minecraft_nats::{subjects, Clock, Publish};
use minecraft_types::ChatCommand;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::responder::CooldownState;

/// Fixed delay between follow-up chunks
const INTER_CHUNK_DELAY: Duration = Duration::from_secs(2);

/// Continuation marker for follow-up chunks
const CONTINUATION_MARKER: &str = "»";

const AI_PREFIXES: [&str; 10] = [
    "✦ AI", "⚡ AI", "☆ AI", "◆ AI", "▲ AI", "♦ AI", "◈ AI", "✨ AI", "⭐ AI", "🔮 AI",
];

const DECORATIONS: [&str; 10] = ["✦", "⚡", "☆", "◆", "▲", "♦", "◈", "✨", "⭐", "🔮"];

/// Split text on word boundaries so no chunk exceeds `max_len`.
///
/// A single word longer than `max_len` becomes its own chunk rather than
/// being split mid-token. Joining the chunks with single spaces
/// reproduces the original word sequence.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_len {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Per-sender queues of follow-up chunks awaiting delivery.
///
/// Every new reply gets a fresh generation number; delivery tasks carry
/// the generation they were scheduled under and stop the moment the
/// queue no longer matches.
pub struct PendingReplyQueue {
    entries: Mutex<HashMap<String, PendingEntry>>,
    generations: AtomicU64,
}

struct PendingEntry {
    generation: u64,
    chunks: VecDeque<String>,
}

impl PendingReplyQueue {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    /// Install a new queue for `username`, superseding any existing one.
    /// Returns the generation token delivery must present.
    pub fn begin(&self, username: &str, chunks: Vec<String>) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = PendingEntry {
            generation,
            chunks: chunks.into(),
        };
        let previous = self
            .entries
            .lock()
            .unwrap()
            .insert(username.to_string(), entry);
        if let Some(old) = previous {
            if !old.chunks.is_empty() {
                debug!(
                    "Superseded {} pending chunk(s) for {}",
                    old.chunks.len(),
                    username
                );
            }
        }
        generation
    }

    /// Whether `generation` is still the live queue for `username`.
    pub fn is_current(&self, username: &str, generation: u64) -> bool {
        self.entries
            .lock()
            .unwrap()
            .get(username)
            .is_some_and(|e| e.generation == generation)
    }

    /// Pop the next chunk if `generation` still owns the queue. The
    /// drained entry is removed, which also ends the sender's sequence.
    pub fn pop_next(&self, username: &str, generation: u64) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(username)?;
        if entry.generation != generation {
            return None;
        }
        match entry.chunks.pop_front() {
            Some(chunk) => Some(chunk),
            None => {
                entries.remove(username);
                None
            }
        }
    }

    /// Drop a sender's queue outright.
    pub fn clear(&self, username: &str) {
        self.entries.lock().unwrap().remove(username);
    }

    /// Chunks still awaiting delivery for a sender.
    pub fn pending(&self, username: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .get(username)
            .map(|e| e.chunks.len())
            .unwrap_or(0)
    }
}

impl Default for PendingReplyQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Schedules segmented replies into world chat.
pub struct ReplyScheduler<P, C> {
    publisher: P,
    clock: C,
    queue: Arc<PendingReplyQueue>,
    cooldown: Arc<CooldownState>,
    chunk_limit: usize,
}

impl<P, C> ReplyScheduler<P, C>
where
    P: Publish + Clone + 'static,
    C: Clock + Clone,
{
    pub fn new(
        publisher: P,
        clock: C,
        cooldown: Arc<CooldownState>,
        chunk_limit: usize,
    ) -> Self {
        Self {
            publisher,
            clock,
            queue: Arc::new(PendingReplyQueue::new()),
            cooldown,
            chunk_limit,
        }
    }

    pub fn queue(&self) -> Arc<PendingReplyQueue> {
        self.queue.clone()
    }

    /// Segment `reply` and schedule its delivery for `username`.
    ///
    /// The cooldown timestamp moves when the first chunk is actually
    /// published, not at decision time. Returns the delivery task handle
    /// (callers normally let it run to completion on its own).
    pub fn deliver(&self, username: &str, reply: &str) -> JoinHandle<()> {
        let mut chunks = segment(reply, self.chunk_limit);
        if chunks.is_empty() {
            return tokio::spawn(async {});
        }

        let rest: Vec<String> = chunks.split_off(1);
        let first_line = decorate_first(&chunks[0], rest.is_empty());
        let generation = self.queue.begin(username, rest);

        let first_delay =
            Duration::from_millis(1000 + rand::thread_rng().gen_range(0..2000u64));

        let publisher = self.publisher.clone();
        let clock = self.clock.clone();
        let queue = self.queue.clone();
        let cooldown = self.cooldown.clone();
        let username = username.to_string();

        tokio::spawn(async move {
            clock.sleep(first_delay).await;

            // A newer reply may have superseded this one during the delay
            if !queue.is_current(&username, generation) {
                debug!("Reply for {} superseded before first chunk", username);
                return;
            }

            let subject = subjects::gateway::chat_send(publisher.prefix());
            let cmd = ChatCommand {
                message: first_line,
            };
            if let Err(e) = publisher.publish(&subject, &cmd).await {
                warn!("Failed to send reply chunk for {}: {}", username, e);
                queue.clear(&username);
                return;
            }
            cooldown.mark(clock.now());

            loop {
                clock.sleep(INTER_CHUNK_DELAY).await;
                let Some(chunk) = queue.pop_next(&username, generation) else {
                    break;
                };
                let cmd = ChatCommand {
                    message: format!("{} {}", CONTINUATION_MARKER, chunk),
                };
                if let Err(e) = publisher.publish(&subject, &cmd).await {
                    warn!("Failed to send follow-up chunk for {}: {}", username, e);
                    queue.clear(&username);
                    break;
                }
            }
        })
    }
}

/// Dress up the opening chunk the way players expect the bot to sound.
fn decorate_first(chunk: &str, single: bool) -> String {
    let mut rng = rand::thread_rng();
    let prefix = AI_PREFIXES[rng.gen_range(0..AI_PREFIXES.len())];
    if single {
        let decoration = DECORATIONS[rng.gen_range(0..DECORATIONS.len())];
        format!("{}: {} {}", prefix, chunk, decoration)
    } else {
        format!("{}: {}", prefix, chunk)
    }
}
