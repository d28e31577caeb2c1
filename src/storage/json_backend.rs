use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{AuthNotifier, Subscription},
    core::utils::{ensure_dir, write_atomic, PathResolver},
    domain::{
        transaction::sort_newest_first, user::display_name_from_email, AuthState, Transaction,
        TransactionDraft, User,
    },
    errors::LedgerError,
};

use super::{ExpenseBackend, Result};

pub const STORE_SCHEMA_VERSION: u8 = 1;

/// On-disk layout of `store.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default = "StoreDocument::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl StoreDocument {
    pub fn schema_version_default() -> u8 {
        STORE_SCHEMA_VERSION
    }
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            users: Vec::new(),
            transactions: Vec::new(),
        }
    }
}

/// Persists users and transactions to a single JSON document on disk.
///
/// Every mutation rewrites the document atomically before returning. The
/// signed-in user lives only in memory.
pub struct JsonBackend {
    path: PathBuf,
    document: Mutex<StoreDocument>,
    current_user: Mutex<Option<User>>,
    notifier: AuthNotifier,
}

impl JsonBackend {
    /// Opens (or creates) the store under `root`, defaulting to the app data directory.
    pub fn open(root: Option<PathBuf>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        ensure_dir(&base)?;
        Self::open_file(PathResolver::store_file_in(&base))
    }

    pub fn open_file(path: PathBuf) -> Result<Self> {
        let document = load_document(&path)?;
        debug!(
            path = %path.display(),
            transactions = document.transactions.len(),
            "opened json store"
        );
        let notifier = AuthNotifier::new();
        notifier.publish(&AuthState::SignedOut);
        Ok(Self {
            path,
            document: Mutex::new(document),
            current_user: Mutex::new(None),
            notifier,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn document(&self) -> MutexGuard<'_, StoreDocument> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn session(&self) -> MutexGuard<'_, Option<User>> {
        self.current_user
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, document: &StoreDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        write_atomic(&self.path, &json)
    }

    fn set_session(&self, user: Option<User>) {
        *self.session() = user.clone();
        self.notifier.publish(&AuthState::from(user));
    }
}

/// Reads a store document, treating a missing file as an empty store.
pub fn load_document(path: &Path) -> Result<StoreDocument> {
    if !path.exists() {
        return Ok(StoreDocument::default());
    }
    let data = fs::read_to_string(path)?;
    let document: StoreDocument = serde_json::from_str(&data)?;
    if document.schema_version > STORE_SCHEMA_VERSION {
        return Err(LedgerError::Storage(format!(
            "store `{}` was written by a newer schema version ({})",
            path.display(),
            document.schema_version
        )));
    }
    Ok(document)
}

impl ExpenseBackend for JsonBackend {
    fn fetch_transactions(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        let mut owned: Vec<Transaction> = self
            .document()
            .transactions
            .iter()
            .filter(|txn| txn.owner_id == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        let mut document = self.document();
        let transaction = draft.into_transaction(Uuid::new_v4().to_string());
        document.transactions.insert(0, transaction.clone());
        if let Err(err) = self.persist(&document) {
            document.transactions.remove(0);
            return Err(err);
        }
        info!(id = %transaction.id, "stored transaction");
        Ok(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        let mut document = self.document();
        let index = document
            .transactions
            .iter()
            .position(|txn| txn.id == transaction.id)
            .ok_or_else(|| LedgerError::NotFound(transaction.id.clone()))?;
        let previous = std::mem::replace(&mut document.transactions[index], transaction.clone());
        if let Err(err) = self.persist(&document) {
            document.transactions[index] = previous;
            return Err(err);
        }
        info!(id = %transaction.id, "updated transaction");
        Ok(transaction)
    }

    fn delete_transaction(&self, id: &str) -> Result<()> {
        let mut document = self.document();
        let index = document
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let removed = document.transactions.remove(index);
        if let Err(err) = self.persist(&document) {
            document.transactions.insert(index, removed);
            return Err(err);
        }
        info!(id, "deleted transaction");
        Ok(())
    }

    fn sign_in(&self, email: &str, _password: &str) -> Result<User> {
        let email = email.trim();
        let user = self
            .document()
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| LedgerError::Auth(format!("no account registered for `{email}`")))?;
        info!(user = %user.id, "signed in");
        self.set_session(Some(user.clone()));
        Ok(user)
    }

    fn sign_up(&self, email: &str, _password: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LedgerError::Auth("email must not be empty".into()));
        }
        let user = {
            let mut document = self.document();
            if document
                .users
                .iter()
                .any(|user| user.email.eq_ignore_ascii_case(email))
            {
                return Err(LedgerError::Auth(format!(
                    "an account already exists for `{email}`"
                )));
            }
            let mut user = User::new(Uuid::new_v4().to_string(), email);
            user.display_name = display_name_from_email(email);
            document.users.push(user.clone());
            if let Err(err) = self.persist(&document) {
                document.users.pop();
                return Err(err);
            }
            user
        };
        info!(user = %user.id, "registered account");
        self.set_session(Some(user.clone()));
        Ok(user)
    }

    fn sign_out(&self) -> Result<()> {
        info!("signed out");
        self.set_session(None);
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.session().clone()
    }

    fn subscribe(&self, handler: Arc<dyn Fn(&AuthState) + Send + Sync>) -> Subscription {
        handler(&AuthState::from(self.current_user()));
        self.notifier.subscribe(move |state| handler(state))
    }
}
