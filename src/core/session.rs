//! Client-side view of one signed-in user's ledger.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::{
    auth::Subscription,
    config::Config,
    core::services::{
        ServiceError, ServiceResult, StatsReport, SummaryService, Totals, TransactionService,
    },
    domain::{AuthState, Category, Transaction, TransactionDraft, TransactionKind, User},
    errors::LedgerError,
    storage::ExpenseBackend,
};

/// Facade that pairs a backend with the signed-in user's cached transactions.
///
/// The cache is newest first, like the backend's fetch ordering: adds are
/// prepended, updates replace in place, deletes remove.
pub struct ExpenseSession {
    backend: Box<dyn ExpenseBackend>,
    auth: Arc<Mutex<AuthState>>,
    cached_for: Option<String>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    trend_months: usize,
    _subscription: Subscription,
}

impl ExpenseSession {
    pub fn open(backend: Box<dyn ExpenseBackend>, config: &Config) -> ServiceResult<Self> {
        let auth = Arc::new(Mutex::new(AuthState::SignedOut));
        let observed = Arc::clone(&auth);
        let subscription = backend.subscribe(Arc::new(move |state: &AuthState| {
            let mut slot = observed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *slot = state.clone();
        }));
        let mut session = Self {
            backend,
            auth,
            cached_for: None,
            transactions: Vec::new(),
            categories: Category::app_defaults(),
            trend_months: config.trend_months,
            _subscription: subscription,
        };
        if session.user().is_some() {
            session.refresh()?;
        }
        Ok(session)
    }

    pub fn backend(&self) -> &dyn ExpenseBackend {
        self.backend.as_ref()
    }

    /// The user from the most recent auth notification.
    pub fn user(&self) -> Option<User> {
        self.auth
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .user()
            .cloned()
    }

    fn require_user(&mut self) -> ServiceResult<User> {
        let user = self.user().ok_or(LedgerError::Unauthenticated)?;
        if self.cached_for.as_deref() != Some(user.id.as_str()) {
            self.transactions.clear();
            self.cached_for = None;
        }
        Ok(user)
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self.backend.sign_in(email, password).map_err(|err| {
            warn!(error = %err, "Login failed");
            ServiceError::from(err)
        })?;
        self.refresh()?;
        Ok(user)
    }

    pub fn sign_up(&mut self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self.backend.sign_up(email, password).map_err(|err| {
            warn!(error = %err, "Registration failed");
            ServiceError::from(err)
        })?;
        self.refresh()?;
        Ok(user)
    }

    pub fn sign_out(&mut self) -> ServiceResult<()> {
        self.backend.sign_out()?;
        self.transactions.clear();
        self.cached_for = None;
        Ok(())
    }

    /// Re-fetches the signed-in user's transactions.
    pub fn refresh(&mut self) -> ServiceResult<&[Transaction]> {
        let user = self.require_user()?;
        self.transactions = TransactionService::list(self.backend.as_ref(), &user.id)
            .map_err(|err| {
                warn!(error = %err, "Failed to fetch expenses");
                err
            })?;
        self.cached_for = Some(user.id.clone());
        info!(user = %user.id, count = self.transactions.len(), "fetched transactions");
        Ok(&self.transactions)
    }

    /// Builds a draft owned by the signed-in user.
    pub fn draft(
        &self,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        occurred_at: DateTime<Utc>,
    ) -> ServiceResult<TransactionDraft> {
        let user = self.user().ok_or(LedgerError::Unauthenticated)?;
        Ok(TransactionDraft::new(
            user.id, kind, category, amount, occurred_at,
        ))
    }

    pub fn add(&mut self, draft: TransactionDraft) -> ServiceResult<Transaction> {
        let user = self.require_user()?;
        if draft.owner_id != user.id {
            return Err(ServiceError::InvalidInput(
                "transaction belongs to another user".into(),
            ));
        }
        let stored = TransactionService::add(self.backend.as_ref(), draft)?;
        if self.cached_for.as_deref() == Some(user.id.as_str()) {
            self.transactions.insert(0, stored.clone());
        } else {
            self.refresh()?;
        }
        Ok(stored)
    }

    pub fn update(&mut self, transaction: Transaction) -> ServiceResult<Transaction> {
        let user = self.require_user()?;
        if transaction.owner_id != user.id {
            return Err(ServiceError::InvalidInput(
                "transaction belongs to another user".into(),
            ));
        }
        self.ensure_owned(&user, &transaction.id)?;
        let stored = TransactionService::update(self.backend.as_ref(), transaction)?;
        if let Some(slot) = self.transactions.iter_mut().find(|txn| txn.id == stored.id) {
            *slot = stored.clone();
        }
        Ok(stored)
    }

    pub fn delete(&mut self, id: &str) -> ServiceResult<()> {
        let user = self.require_user()?;
        self.ensure_owned(&user, id)?;
        TransactionService::delete(self.backend.as_ref(), id)?;
        self.transactions.retain(|txn| txn.id != id);
        Ok(())
    }

    /// Records owned by someone else are reported as missing.
    fn ensure_owned(&self, user: &User, id: &str) -> ServiceResult<()> {
        let owned = TransactionService::list(self.backend.as_ref(), &user.id)?;
        if owned.iter().any(|txn| txn.id == id) {
            return Ok(());
        }
        warn!(user = %user.id, id, "refused write to a record outside the session");
        Err(LedgerError::NotFound(id.to_string()).into())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn totals(&self) -> Totals {
        SummaryService::compute_totals(&self.transactions)
    }

    /// Statistics for the cached transactions, anchored at `reference`.
    pub fn stats(&self, reference: NaiveDate) -> ServiceResult<StatsReport> {
        SummaryService::stats_report(&self.transactions, reference, self.trend_months)
    }
}
