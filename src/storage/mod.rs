pub mod json_backend;
pub mod memory;

use std::{env, sync::Arc};

use tracing::info;

use crate::{
    auth::Subscription,
    config::{BackendKind, Config},
    core::time::Clock,
    domain::{AuthState, Transaction, TransactionDraft, User},
    errors::LedgerError,
};

pub use json_backend::JsonBackend;
pub use memory::DemoBackend;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Environment switch that forces the in-memory demo backend.
pub const DEMO_MODE_ENV: &str = "EXPENSE_CORE_DEMO_MODE";

/// Capability set shared by the demo store and the persisted store.
///
/// Implementations only move records in and out; validation happens in
/// [`TransactionService`](crate::core::services::TransactionService) before a
/// write reaches the backend.
pub trait ExpenseBackend: Send + Sync {
    /// Every transaction owned by `owner_id`, newest first.
    fn fetch_transactions(&self, owner_id: &str) -> Result<Vec<Transaction>>;
    /// Stores `draft` under a freshly assigned id.
    fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction>;
    /// Replaces the stored record with the same id.
    fn update_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    fn delete_transaction(&self, id: &str) -> Result<()>;

    fn sign_in(&self, email: &str, password: &str) -> Result<User>;
    fn sign_up(&self, email: &str, password: &str) -> Result<User>;
    fn sign_out(&self) -> Result<()>;
    fn current_user(&self) -> Option<User>;

    /// Registers `handler` for auth changes. The handler is called once with the
    /// current state before this returns.
    fn subscribe(&self, handler: Arc<dyn Fn(&AuthState) + Send + Sync>) -> Subscription;
}

/// Picks the backend once at startup from `config` and the environment.
pub fn open_backend(config: &Config, clock: Arc<dyn Clock>) -> Result<Box<dyn ExpenseBackend>> {
    let kind = if demo_mode_forced() {
        BackendKind::Demo
    } else {
        config.backend
    };
    info!(backend = ?kind, "opening expense backend");
    match kind {
        BackendKind::Demo => Ok(Box::new(DemoBackend::new(clock))),
        BackendKind::Json => Ok(Box::new(JsonBackend::open(config.data_dir.clone())?)),
    }
}

fn demo_mode_forced() -> bool {
    env::var(DEMO_MODE_ENV)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
