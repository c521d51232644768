//! The confirmation orchestrator: per-conversation pending-decision state
//! and the Idle → AwaitingConfirmation → Idle machine around it.
//!
//! Hard invariant: while a pending list exists for a conversation key, any
//! inbound text on that key is a reply to it — never a new extraction
//! request. The pending map is the only mutable shared structure in the
//! core; it lives behind [`PendingStore`] and every take/set is atomic.

mod reply;

pub use reply::{parse_decisions, render_confirmation_text, Decision};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::ai::AiConfig;
use crate::db_call;
use crate::error::CrmError;
use crate::extract;
use crate::similarity::{self, Classification};
use crate::store::ContactRecord;
use crate::util::valid_name;
use crate::SharedDB;

/// Identifies one independent confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConvKey {
    pub channel: String,
    pub user: String,
}

impl ConvKey {
    pub fn new(channel: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            user: user.into(),
        }
    }
}

/// A candidate record parked on a user yes/no decision against a suggested
/// existing contact.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub record: ContactRecord,
    pub suggested_name: String,
}

/// Conversation key → ordered pending list. Injected so the backing can move
/// to an external cache or durable store without touching orchestrator logic.
pub trait PendingStore: Send + Sync {
    fn get(&self, key: &ConvKey) -> Option<Vec<PendingConfirmation>>;
    fn take(&self, key: &ConvKey) -> Option<Vec<PendingConfirmation>>;
    fn set(&self, key: &ConvKey, pending: Vec<PendingConfirmation>);
}

/// In-process backing: a single mutex around the map keeps each get/take/set
/// atomic per operation.
#[derive(Default)]
pub struct MemoryPendingStore {
    inner: parking_lot::Mutex<HashMap<ConvKey, Vec<PendingConfirmation>>>,
}

impl PendingStore for MemoryPendingStore {
    fn get(&self, key: &ConvKey) -> Option<Vec<PendingConfirmation>> {
        self.inner.lock().get(key).cloned()
    }

    fn take(&self, key: &ConvKey) -> Option<Vec<PendingConfirmation>> {
        self.inner.lock().remove(key)
    }

    fn set(&self, key: &ConvKey, pending: Vec<PendingConfirmation>) {
        self.inner.lock().insert(key.clone(), pending);
    }
}

pub struct Orchestrator {
    db: SharedDB,
    pending: Arc<dyn PendingStore>,
    /// One async mutex per conversation key: a key's messages are handled
    /// strictly one at a time, different keys run in parallel.
    locks: parking_lot::Mutex<HashMap<ConvKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(db: SharedDB, pending: Arc<dyn PendingStore>) -> Self {
        Self {
            db,
            pending,
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    fn conversation_lock(&self, key: &ConvKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Entry point for one inbound text on one conversation. Returns the
    /// reply lines to send back.
    pub async fn handle_message(
        &self,
        ai: Option<&AiConfig>,
        key: &ConvKey,
        text: &str,
    ) -> Result<Vec<String>, CrmError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }

        let lock = self.conversation_lock(key);
        let _guard = lock.lock().await;

        if let Some(pending) = self.pending.take(key) {
            info!(
                channel = %key.channel,
                pending = pending.len(),
                "treating inbound text as confirmation reply"
            );
            return Ok(self.apply_reply(pending, text).await);
        }

        let Some(cfg) = ai else {
            return Err(CrmError::AiNotConfigured);
        };
        let records = extract::extract(cfg, text).await?;
        info!(channel = %key.channel, records = records.len(), "extracted candidate records");
        self.resolve_batch(key, records).await
    }

    /// Idle-state batch processing: classify each record, write through the
    /// unambiguous ones, park the fuzzy ones. When anything is parked the
    /// only reply is the confirmation prompt.
    pub async fn resolve_batch(
        &self,
        key: &ConvKey,
        records: Vec<ContactRecord>,
    ) -> Result<Vec<String>, CrmError> {
        let mut msgs = Vec::new();
        let mut pending = Vec::new();

        for record in records {
            let name_ok = record
                .name
                .as_deref()
                .map(str::trim)
                .map(valid_name)
                .unwrap_or(false);
            if !name_ok {
                // upsert rejects before touching the store; reuse its message
                let rec = record.clone();
                let outcome = db_call(&self.db, move |db| db.upsert(&rec, false)).await??;
                msgs.push(outcome.message());
                continue;
            }

            let rec = record.clone();
            let classification = db_call(&self.db, move |db| similarity::classify(db, &rec))
                .await?
                .unwrap_or_else(|e| {
                    warn!(error = %e, "similarity lookup failed, treating as no match");
                    Classification::NoMatch
                });

            match classification {
                Classification::Suggest { contact, score } => {
                    info!(suggested = %contact.name, score, "parking record for confirmation");
                    pending.push(PendingConfirmation {
                        record,
                        suggested_name: contact.name,
                    });
                }
                Classification::ExactMatch(_) | Classification::NoMatch => {
                    let outcome = db_call(&self.db, move |db| db.upsert(&record, false)).await??;
                    msgs.push(outcome.message());
                }
            }
        }

        if pending.is_empty() {
            return Ok(msgs);
        }
        let prompt = render_confirmation_text(&pending);
        self.pending.set(key, pending);
        Ok(vec![prompt])
    }

    /// AwaitingConfirmation-state reply processing. The pending list was
    /// already taken, so the conversation is back in Idle no matter what the
    /// reply contains. Positions without a valid decision are dropped, never
    /// committed.
    pub async fn apply_reply(
        &self,
        pending: Vec<PendingConfirmation>,
        text: &str,
    ) -> Vec<String> {
        let decisions = parse_decisions(text);
        let mut msgs = Vec::new();

        for (i, confirmation) in pending.into_iter().enumerate() {
            let (mut record, force_create) = match decisions.get(&i) {
                Some(Decision::Yes) => (confirmation.record, false),
                Some(Decision::No) => (confirmation.record, true),
                None => {
                    msgs.push("No valid decision provided (expected yes/no).".to_string());
                    continue;
                }
            };
            if !force_create {
                // merge: adopt the suggested name so the upsert lookup lands
                // on the existing contact
                record.name = Some(confirmation.suggested_name);
            }

            let outcome = match db_call(&self.db, move |db| db.upsert(&record, force_create)).await
            {
                Ok(inner) => inner,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(o) => msgs.push(o.message()),
                Err(e) => {
                    warn!(error = %e, position = i, "confirmed upsert failed");
                    msgs.push("Sorry, I couldn't save that record.".to_string());
                }
            }
        }

        msgs
    }
}
