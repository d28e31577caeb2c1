//! In-memory backend used for demos and tests.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::{
    auth::{AuthNotifier, Subscription},
    core::time::Clock,
    domain::{
        transaction::sort_newest_first, user::display_name_from_email, AuthState, Transaction,
        TransactionDraft, TransactionKind, User,
    },
    errors::LedgerError,
};

use super::{ExpenseBackend, Result};

pub const DEMO_USER_ID: &str = "demo-user-1";
pub const DEMO_USER_EMAIL: &str = "demo@expense-tracker.local";
pub const DEMO_USER_NAME: &str = "Demo User";

struct DemoState {
    current_user: Option<User>,
    transactions: Vec<Transaction>,
    next_transaction: u64,
    next_user: u64,
}

/// Keeps users and transactions in process memory. Nothing survives a restart.
pub struct DemoBackend {
    state: Mutex<DemoState>,
    notifier: AuthNotifier,
    clock: Arc<dyn Clock>,
}

impl DemoBackend {
    /// Starts signed in as the demo user with the demo transactions loaded.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let transactions = Self::seed_transactions(clock.as_ref());
        Self::from_parts(clock, Some(Self::demo_user()), transactions)
    }

    pub fn from_parts(
        clock: Arc<dyn Clock>,
        current_user: Option<User>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let notifier = AuthNotifier::new();
        notifier.publish(&AuthState::from(current_user.clone()));
        Self {
            state: Mutex::new(DemoState {
                current_user,
                transactions,
                next_transaction: 1,
                next_user: 2,
            }),
            notifier,
            clock,
        }
    }

    pub fn demo_user() -> User {
        User::new(DEMO_USER_ID, DEMO_USER_EMAIL).with_display_name(DEMO_USER_NAME)
    }

    /// The demo user's starting transactions, dated relative to `clock`.
    pub fn seed_transactions(clock: &dyn Clock) -> Vec<Transaction> {
        let seed = [
            (20, TransactionKind::Income, "Income", 3200.0, "Monthly salary"),
            (18, TransactionKind::Expense, "Bills", 1250.0, "Rent"),
            (10, TransactionKind::Expense, "Food", 92.45, "Groceries"),
            (7, TransactionKind::Expense, "Entertainment", 45.0, "Movie night"),
            (5, TransactionKind::Expense, "Transport", 60.25, "Gas"),
            (2, TransactionKind::Expense, "Shopping", 28.99, "Household items"),
        ];
        seed.into_iter()
            .enumerate()
            .map(|(idx, (days, kind, category, amount, note))| {
                TransactionDraft::new(DEMO_USER_ID, kind, category, amount, clock.days_ago(days))
                    .with_note(note)
                    .into_transaction(format!("exp_demo_{}", idx + 1))
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, DemoState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish_current(&self) {
        let state = AuthState::from(self.current_user());
        self.notifier.publish(&state);
    }
}

impl DemoState {
    fn next_transaction_id(&mut self) -> String {
        let id = format!("exp_{}", self.next_transaction);
        self.next_transaction += 1;
        id
    }
}

impl ExpenseBackend for DemoBackend {
    fn fetch_transactions(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        let mut owned: Vec<Transaction> = self
            .lock()
            .transactions
            .iter()
            .filter(|txn| txn.owner_id == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        let mut state = self.lock();
        let id = state.next_transaction_id();
        let transaction = draft.into_transaction(id);
        state.transactions.insert(0, transaction.clone());
        Ok(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        let mut state = self.lock();
        let slot = state
            .transactions
            .iter_mut()
            .find(|txn| txn.id == transaction.id)
            .ok_or_else(|| LedgerError::NotFound(transaction.id.clone()))?;
        *slot = transaction.clone();
        Ok(transaction)
    }

    fn delete_transaction(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        let before = state.transactions.len();
        state.transactions.retain(|txn| txn.id != id);
        if state.transactions.len() == before {
            return Err(LedgerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn sign_in(&self, email: &str, _password: &str) -> Result<User> {
        let user = match email.trim() {
            "" => Self::demo_user(),
            email => {
                let mut user = User::new(DEMO_USER_ID, email);
                user.display_name = display_name_from_email(email);
                user
            }
        };
        self.lock().current_user = Some(user.clone());
        info!(user = %user.id, "demo sign-in");
        self.publish_current();
        Ok(user)
    }

    fn sign_up(&self, email: &str, _password: &str) -> Result<User> {
        let user = {
            let mut state = self.lock();
            let user_id = format!("demo-user-{}", state.next_user);
            state.next_user += 1;
            let mut user = User::new(user_id.clone(), email.trim());
            user.display_name =
                display_name_from_email(email).or_else(|| Some(DEMO_USER_NAME.to_string()));

            let starters = [
                TransactionDraft::new(
                    user_id.clone(),
                    TransactionKind::Income,
                    "Income",
                    1500.0,
                    self.clock.days_ago(12),
                )
                .with_note("Demo income"),
                TransactionDraft::new(
                    user_id,
                    TransactionKind::Expense,
                    "Food",
                    75.5,
                    self.clock.days_ago(4),
                )
                .with_note("Demo groceries"),
            ];
            let mut seeded: Vec<Transaction> = starters
                .into_iter()
                .map(|draft| {
                    let id = state.next_transaction_id();
                    draft.into_transaction(id)
                })
                .collect();
            seeded.append(&mut state.transactions);
            state.transactions = seeded;
            state.current_user = Some(user.clone());
            user
        };
        info!(user = %user.id, "demo sign-up");
        self.publish_current();
        Ok(user)
    }

    fn sign_out(&self) -> Result<()> {
        self.lock().current_user = None;
        info!("demo sign-out");
        self.publish_current();
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.lock().current_user.clone()
    }

    fn subscribe(&self, handler: Arc<dyn Fn(&AuthState) + Send + Sync>) -> Subscription {
        handler(&AuthState::from(self.current_user()));
        self.notifier.subscribe(move |state| handler(state))
    }
}
