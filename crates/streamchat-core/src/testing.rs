//! Test doubles for session and persistence tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::Notify;

use streamchat_types::error::RepositoryError;
use streamchat_types::llm::{ChatConfig, ChatTurn, LlmError, StreamChunk};

use crate::llm::provider::{BoxChatHandle, ChatHandle, ChatProvider, ChunkStream};
use crate::storage::kv_store::KvStore;

// ---------------------------------------------------------------------------
// Key-value store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct KvInner {
    values: Mutex<HashMap<String, String>>,
    sets: AtomicUsize,
    deletes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory `KvStore` that counts writes. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    inner: Arc<KvInner>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .inner
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.values.lock().unwrap().get(key).cloned()
    }

    pub fn set_count(&self) -> usize {
        self.inner.sets.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.inner.deletes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        self.inner.sets.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.inner
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.inner.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.values.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chat provider
// ---------------------------------------------------------------------------

/// What one `send_stream` call does.
#[derive(Default)]
pub struct Script {
    setup_error: Option<String>,
    chunks: Vec<Result<String, String>>,
    gate: Option<Arc<Notify>>,
}

impl Script {
    /// Stream these fragments, then complete.
    pub fn reply(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| Ok(c.to_string())).collect(),
            ..Default::default()
        }
    }

    /// Stream these fragments, then fail.
    pub fn fail_after(chunks: &[&str], error: &str) -> Self {
        let mut script = Self::reply(chunks);
        script.chunks.push(Err(error.to_string()));
        script
    }

    /// Reject the request before any fragment arrives.
    pub fn setup_failure(error: &str) -> Self {
        Self {
            setup_error: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// Hold the stream open until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[derive(Default)]
struct ProviderInner {
    scripts: Mutex<VecDeque<Script>>,
    created: Mutex<Vec<Vec<ChatTurn>>>,
    sent: Mutex<Vec<String>>,
    fail_create: AtomicBool,
}

/// Provider whose handles replay queued [`Script`]s. Clones share state.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<ProviderInner>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, script: Script) {
        self.inner.scripts.lock().unwrap().push_back(script);
    }

    pub fn fail_create(&self, fail: bool) {
        self.inner.fail_create.store(fail, Ordering::SeqCst);
    }

    /// History each created handle was seeded with, in creation order.
    pub fn created(&self) -> Vec<Vec<ChatTurn>> {
        self.inner.created.lock().unwrap().clone()
    }

    /// Every text passed to `send_stream`.
    pub fn sent(&self) -> Vec<String> {
        self.inner.sent.lock().unwrap().clone()
    }
}

impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create_chat(
        &self,
        _config: &ChatConfig,
        history: Vec<ChatTurn>,
    ) -> Result<BoxChatHandle, LlmError> {
        if self.inner.fail_create.load(Ordering::SeqCst) {
            return Err(LlmError::MissingCredential("API_KEY".to_string()));
        }
        self.inner.created.lock().unwrap().push(history.clone());
        Ok(Box::new(ScriptedHandle {
            history,
            provider: self.inner.clone(),
        }))
    }
}

struct ScriptedHandle {
    history: Vec<ChatTurn>,
    provider: Arc<ProviderInner>,
}

impl ChatHandle for ScriptedHandle {
    fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn send_stream<'a>(
        &'a mut self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<ChunkStream<'a>, LlmError>> {
        self.provider.sent.lock().unwrap().push(text.to_string());
        let Script {
            setup_error,
            chunks,
            gate,
        } = self
            .provider
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        let history = &mut self.history;

        Box::pin(async move {
            if let Some(message) = setup_error {
                return Err(LlmError::Provider { message });
            }

            let stream: ChunkStream<'a> = Box::pin(async_stream::try_stream! {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                let mut reply = String::new();
                for chunk in chunks {
                    let chunk = chunk.map_err(LlmError::Stream)?;
                    reply.push_str(&chunk);
                    yield StreamChunk::new(chunk);
                }
                history.push(ChatTurn::user(text));
                history.push(ChatTurn::model(reply));
            });
            Ok(stream)
        })
    }
}
