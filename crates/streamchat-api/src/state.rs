//! Application state wiring storage, configuration and the chat backend.
//!
//! The session is generic over provider and store traits; AppState pins it to
//! the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use streamchat_core::chat::persistence::ChatHistoryStore;
use streamchat_core::chat::session::ChatSession;
use streamchat_infra::config::load_config;
use streamchat_infra::filesystem::resolve_data_dir;
use streamchat_infra::llm::create_provider;
use streamchat_infra::llm::gemini::GeminiProvider;
use streamchat_infra::sqlite::kv::SqliteKvStore;
use streamchat_infra::sqlite::pool::DatabasePool;
use streamchat_types::config::ChatConfigFile;

/// Session type pinned to Gemini and SQLite.
pub type ConcreteChatSession = ChatSession<GeminiProvider, SqliteKvStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatConfigFile,
    pub data_dir: PathBuf,
    pub kv_store: SqliteKvStore,
}

impl AppState {
    /// Initialize the application state: load config, open the database.
    pub async fn init(model_override: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        let mut config = load_config(&data_dir).await;
        if let Some(model) = model_override {
            config.model = model;
        }

        let db_pool = DatabasePool::open(&data_dir).await?;
        tracing::debug!(data_dir = %data_dir.display(), model = %config.model, "app state initialized");

        Ok(Self {
            config,
            data_dir,
            kv_store: SqliteKvStore::new(db_pool),
        })
    }

    /// Snapshot access without a chat backend (history/clear subcommands).
    pub fn history_store(&self) -> ChatHistoryStore<SqliteKvStore> {
        ChatHistoryStore::new(self.kv_store.clone())
    }

    /// Build the chat session. No chat handle exists until `restore()`.
    pub fn chat_session(&self) -> anyhow::Result<Arc<ConcreteChatSession>> {
        let provider = create_provider(&self.config)?;
        Ok(Arc::new(ChatSession::new(
            provider,
            self.config.chat_config(),
            self.kv_store.clone(),
        )))
    }
}
