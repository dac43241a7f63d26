//! Chat session controller.
//!
//! Owns the single conversation handle, the message store, the busy flag and
//! the user-facing error. Startup replays the persisted snapshot into both
//! the store and the handle; each completed turn writes the snapshot back
//! exactly once, on the busy -> idle transition.
//!
//! All methods take `&self`. State sits behind a `tokio::sync::Mutex` that is
//! only held for short critical sections, so a UI can call `clear` or a
//! second `send_message` while a reply is streaming; the busy flag turns
//! those into no-ops.
//!
//! A send that never reaches its normal cleanup (the future is dropped by a
//! timeout or task abort, or the backend panics) still hands the handle back
//! and clears busy through [`TurnGuard`]; only the snapshot write is skipped.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, warn};

use streamchat_types::chat::ChatMessage;
use streamchat_types::error::{INIT_ERROR_MESSAGE, SessionError};
use streamchat_types::event::SessionEvent;
use streamchat_types::llm::{ChatConfig, ChatTurn, history_from_messages};

use crate::event::EventBus;
use crate::llm::provider::{BoxChatHandle, ChatProvider};
use crate::storage::kv_store::KvStore;

use super::consumer::StreamConsumer;
use super::persistence::ChatHistoryStore;
use super::store::MessageStore;

/// Why a send did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The text was empty or only whitespace.
    EmptyText,
    /// Another reply is still streaming.
    Busy,
    /// No conversation handle (initialization failed).
    NoHandle,
}

/// Result of [`ChatSession::send_message`].
#[derive(Debug)]
pub enum TurnOutcome {
    /// Nothing was sent and nothing changed.
    Skipped(SkipReason),
    /// The reply streamed to completion into message `message_id`.
    Completed { message_id: String },
    /// The reply failed; the error message has been appended to the chat.
    Failed { error: SessionError },
}

/// Point-in-time copy of what the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
    pub error: Option<String>,
}

/// Mutable session state, guarded by the session mutex.
pub(crate) struct SessionState {
    pub(crate) handle: Option<BoxChatHandle>,
    pub(crate) store: MessageStore,
    busy: bool,
    error: Option<String>,
    events: EventBus,
}

impl SessionState {
    fn new(events: EventBus) -> Self {
        Self {
            handle: None,
            store: MessageStore::new(events.clone()),
            busy: false,
            error: None,
            events,
        }
    }

    /// Set the busy flag, returning the previous value.
    fn set_busy(&mut self, busy: bool) -> bool {
        let previous = std::mem::replace(&mut self.busy, busy);
        if previous != busy {
            self.events.publish(SessionEvent::BusyChanged { busy });
        }
        previous
    }

    /// Take the handle back after a send and leave the busy state.
    fn end_turn(&mut self, handle: BoxChatHandle) -> bool {
        self.handle = Some(handle);
        self.set_busy(false)
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        if self.error != error {
            self.error = error.clone();
            self.events.publish(SessionEvent::ErrorChanged { error });
        }
    }
}

/// The conversation controller.
///
/// Generic over the chat backend and the key-value store so that
/// streamchat-core never depends on streamchat-infra.
pub struct ChatSession<P: ChatProvider, K: KvStore> {
    provider: P,
    config: ChatConfig,
    history: ChatHistoryStore<K>,
    events: EventBus,
    state: Arc<Mutex<SessionState>>,
}

/// Holds the conversation handle while a send is in flight.
///
/// The normal path returns the handle through [`ChatSession::finish_turn`].
/// If the guard is dropped still holding it, the handle goes back and busy
/// is cleared right there, or from a spawned task when the state lock is
/// taken at that moment.
struct TurnGuard {
    state: Arc<Mutex<SessionState>>,
    handle: Option<BoxChatHandle>,
}

impl TurnGuard {
    fn new(state: Arc<Mutex<SessionState>>, handle: BoxChatHandle) -> Self {
        Self {
            state,
            handle: Some(handle),
        }
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        warn!("chat turn abandoned before completion, releasing session");

        match self.state.try_lock() {
            Ok(mut state) => {
                state.end_turn(handle);
            }
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    let state = Arc::clone(&self.state);
                    runtime.spawn(async move {
                        state.lock().await.end_turn(handle);
                    });
                }
                Err(_) => debug!("no runtime left to release the session"),
            },
        }
    }
}

impl<P: ChatProvider, K: KvStore> ChatSession<P, K> {
    /// Create a session with no handle yet; call [`restore`](Self::restore)
    /// or [`start`](Self::start) before sending.
    pub fn new(provider: P, config: ChatConfig, kv: K) -> Self {
        let events = EventBus::default();
        Self {
            provider,
            config,
            history: ChatHistoryStore::new(kv),
            state: Arc::new(Mutex::new(SessionState::new(events.clone()))),
            events,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Access the snapshot store.
    pub fn history_store(&self) -> &ChatHistoryStore<K> {
        &self.history
    }

    /// Receive every future change to messages, busy flag and error.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> SessionView {
        let state = self.state.lock().await;
        SessionView {
            messages: state.store.messages().to_vec(),
            busy: state.busy,
            error: state.error.clone(),
        }
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.busy
    }

    /// Turns the active handle carries as remote context, if there is one.
    pub async fn remote_history(&self) -> Option<Vec<ChatTurn>> {
        let state = self.state.lock().await;
        state.handle.as_ref().map(|h| h.history().to_vec())
    }

    /// Build a new conversation handle, replacing the current one.
    ///
    /// With `history`, the messages are translated to remote turns and
    /// supplied as prior context. The message store is left untouched.
    pub async fn start(&self, history: Option<&[ChatMessage]>) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state, history)
    }

    /// Startup: replay the stored snapshot if there is one, else start empty.
    pub async fn restore(&self) -> Result<(), SessionError> {
        let saved = self.history.load().await;
        let mut state = self.state.lock().await;

        match saved {
            Some(messages) if !messages.is_empty() => {
                info!(count = messages.len(), "restoring chat history");
                state.store.replace_all(messages.clone());
                self.start_locked(&mut state, Some(&messages))
            }
            _ => self.start_fresh_locked(&mut state),
        }
    }

    /// Send `text` and stream the reply into the message store.
    ///
    /// Empty/whitespace text, a send already in flight, or a missing handle
    /// make this a no-op. Stream failures are recovered here and reported as
    /// [`TurnOutcome::Failed`].
    pub async fn send_message(&self, text: &str) -> TurnOutcome {
        let mut guard = {
            let mut state = self.state.lock().await;
            if text.trim().is_empty() {
                return TurnOutcome::Skipped(SkipReason::EmptyText);
            }
            if state.busy {
                debug!("send ignored: reply already streaming");
                return TurnOutcome::Skipped(SkipReason::Busy);
            }
            let Some(handle) = state.handle.take() else {
                debug!("send ignored: no chat handle");
                return TurnOutcome::Skipped(SkipReason::NoHandle);
            };

            state.store.append(ChatMessage::user(text));
            state.set_busy(true);
            state.set_error(None);
            TurnGuard::new(Arc::clone(&self.state), handle)
        };

        debug!(provider = self.provider.name(), model = %self.config.model, "sending message");
        let outcome = match guard.handle.as_mut() {
            Some(handle) => StreamConsumer::new(&self.state).run(handle, text).await,
            None => TurnOutcome::Skipped(SkipReason::NoHandle),
        };

        self.finish_turn(&mut guard).await;
        outcome
    }

    /// Forget the conversation: delete the snapshot, start a new empty handle.
    ///
    /// Returns `Ok(false)` without doing anything while a reply is streaming.
    pub async fn clear(&self) -> Result<bool, SessionError> {
        let mut state = self.state.lock().await;
        if state.busy {
            debug!("clear ignored: reply already streaming");
            return Ok(false);
        }

        if let Err(e) = self.history.clear().await {
            warn!(error = %e, "failed to delete stored chat history");
        }
        state.handle = None;
        self.start_fresh_locked(&mut state)?;
        info!("chat cleared");
        Ok(true)
    }

    /// Cleanup for every send: hand the handle back, leave the busy state
    /// and persist the conversation once.
    ///
    /// The snapshot is written with the lock held so a `clear` cannot slip in
    /// between the transition and the write.
    async fn finish_turn(&self, guard: &mut TurnGuard) {
        let mut state = self.state.lock().await;
        let Some(handle) = guard.handle.take() else {
            return;
        };
        let was_busy = state.end_turn(handle);

        if was_busy && !state.store.is_empty() {
            let messages = state.store.messages().to_vec();
            if let Err(e) = self.history.save(&messages).await {
                warn!(error = %e, "failed to save chat history");
            }
        }
    }

    fn start_locked(
        &self,
        state: &mut SessionState,
        history: Option<&[ChatMessage]>,
    ) -> Result<(), SessionError> {
        let turns = history.map(history_from_messages).unwrap_or_default();
        let turn_count = turns.len();

        match self.provider.create_chat(&self.config, turns) {
            Ok(handle) => {
                debug!(provider = self.provider.name(), turns = turn_count, "chat handle created");
                state.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to initialize chat");
                state.handle = None;
                state.set_error(Some(INIT_ERROR_MESSAGE.to_string()));
                Err(SessionError::Initialization(e.to_string()))
            }
        }
    }

    /// Empty the store, then build a handle with no prior context.
    ///
    /// The store is emptied even when handle creation fails, so the screen
    /// never shows messages that are no longer stored.
    fn start_fresh_locked(&self, state: &mut SessionState) -> Result<(), SessionError> {
        state.store.replace_all(Vec::new());
        self.start_locked(state, None)?;
        state.set_error(None);
        Ok(())
    }
}
