//! Change notifications keyed by record family.
//!
//! Consumers never receive payload diffs: a notice only says that a family
//! changed, and the consumer re-fetches. The [`ChangeBus`] owns a tokio
//! [`broadcast`] channel; every [`ChangeFeed`] is an independent receiver.
//!
//! If a feed falls behind by more than the channel capacity it reports
//! [`FeedEvent::Lagged`], which consumers should treat as "everything may
//! have changed".

use league_types::Family;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the change broadcast channel.
pub const FEED_CAPACITY: usize = 256;

/// What kind of write produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A record was inserted.
    Insert,
    /// A record was updated.
    Update,
    /// A record was deleted.
    Delete,
}

impl ChangeKind {
    /// Parse the lowercase SQL operation name (`insert`, `update`, `delete`).
    pub fn from_sql_op(op: &str) -> Option<Self> {
        match op {
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A "something changed" notice for one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// The family that changed.
    pub family: Family,
    /// The kind of write.
    pub kind: ChangeKind,
}

impl ChangeNotice {
    /// Build a notice.
    pub const fn new(family: Family, kind: ChangeKind) -> Self {
        Self { family, kind }
    }

    /// Parse a `"<table>:<op>"` payload as sent by the database trigger.
    pub fn parse_payload(payload: &str) -> Option<Self> {
        let (table, op) = payload.split_once(':')?;
        let family = table.parse().ok()?;
        let kind = ChangeKind::from_sql_op(op)?;
        Some(Self { family, kind })
    }
}

/// What a [`ChangeFeed`] yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// A family changed.
    Changed(ChangeNotice),
    /// The feed skipped this many notices; re-fetch everything.
    Lagged(u64),
    /// The store was dropped; no more notices will arrive.
    Closed,
}

/// Sending half of the change feed, owned by a store.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeNotice>,
}

impl ChangeBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Publish a notice to every subscriber.
    ///
    /// Returns the number of feeds that received it; 0 when nobody is
    /// subscribed, which is not an error.
    pub fn publish(&self, notice: ChangeNotice) -> usize {
        let delivered = self.tx.send(notice).unwrap_or(0);
        tracing::debug!(
            family = %notice.family,
            kind = ?notice.kind,
            delivered,
            "Change notice published"
        );
        delivered
    }

    /// Open a new feed.
    pub fn subscribe(&self) -> ChangeFeed {
        ChangeFeed {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of the change feed.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: broadcast::Receiver<ChangeNotice>,
}

impl ChangeFeed {
    /// Wait for the next notice of any family.
    pub async fn recv(&mut self) -> FeedEvent {
        match self.rx.recv().await {
            Ok(notice) => FeedEvent::Changed(notice),
            Err(broadcast::error::RecvError::Lagged(n)) => FeedEvent::Lagged(n),
            Err(broadcast::error::RecvError::Closed) => FeedEvent::Closed,
        }
    }

    /// Wait for the next notice about one of `families`, skipping others.
    ///
    /// Lag and closure are always reported.
    pub async fn recv_for(&mut self, families: &[Family]) -> FeedEvent {
        loop {
            match self.recv().await {
                FeedEvent::Changed(notice) if !families.contains(&notice.family) => {}
                event => return event,
            }
        }
    }
}
