mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use expense_core::{
    config::{BackendKind, Config, ConfigManager},
    core::{
        services::{ServiceError, TransactionService},
        ExpenseSession,
    },
    domain::{AuthState, TransactionKind},
    errors::LedgerError,
    storage::{open_backend, ExpenseBackend, JsonBackend},
};

use common::{at, fixed_clock, temp_home};

fn json_config(home: std::path::PathBuf) -> Config {
    Config {
        backend: BackendKind::Json,
        data_dir: Some(home),
        ..Config::default()
    }
}

#[test]
fn session_over_json_store_survives_restart() {
    let home = temp_home();
    let config = json_config(home.clone());

    let stored_id = {
        let backend = open_backend(&config, fixed_clock()).unwrap();
        let mut session = ExpenseSession::open(backend, &config).unwrap();
        session.sign_up("pat@example.com", "pw").unwrap();
        let draft = session
            .draft(TransactionKind::Expense, "Bills", 80.0, at(2024, 6, 3))
            .unwrap();
        session.add(draft).unwrap().id
    };

    let backend = open_backend(&config, fixed_clock()).unwrap();
    let mut session = ExpenseSession::open(backend, &config).unwrap();
    assert!(session.user().is_none());
    session.sign_in("pat@example.com", "pw").unwrap();
    assert_eq!(session.transactions().len(), 1);
    assert_eq!(session.transactions()[0].id, stored_id);
    assert_eq!(session.totals().expense_total, 80.0);
}

#[test]
fn writes_require_a_signed_in_user() {
    let home = temp_home();
    let config = json_config(home);
    let backend = open_backend(&config, fixed_clock()).unwrap();
    let mut session = ExpenseSession::open(backend, &config).unwrap();

    let err = session.refresh().unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::Unauthenticated)
    ));
}

#[test]
fn auth_subscribers_see_each_transition_once() {
    let home = temp_home();
    let backend = JsonBackend::open(Some(home)).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let subscription = backend.subscribe(Arc::new(move |_state: &AuthState| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    backend.sign_up("sam@example.com", "pw").unwrap();
    backend.sign_out().unwrap();
    backend.sign_out().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    drop(subscription);
    backend.sign_in("sam@example.com", "pw").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn demo_backend_selected_from_config() {
    let home = temp_home();
    let manager = ConfigManager::with_base_dir(home.clone()).unwrap();
    let config = Config {
        backend: BackendKind::Demo,
        ..Config::default()
    };
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    let backend = open_backend(&loaded, fixed_clock()).unwrap();
    let user = backend.current_user().expect("demo user is signed in");
    let owned = TransactionService::list(backend.as_ref(), &user.id).unwrap();
    assert_eq!(owned.len(), 6);
    assert!(!home.join("store.json").exists());
}

#[test]
fn accounts_cannot_rewrite_or_delete_each_others_records() {
    let home = temp_home();
    let config = json_config(home);
    let backend = open_backend(&config, fixed_clock()).unwrap();
    let mut session = ExpenseSession::open(backend, &config).unwrap();

    let alice = session.sign_up("alice@example.com", "pw").unwrap();
    let draft = session
        .draft(TransactionKind::Expense, "Food", 50.0, at(2024, 6, 2))
        .unwrap();
    let record = session.add(draft).unwrap();
    session.sign_out().unwrap();

    let bob = session.sign_up("bob@example.com", "pw").unwrap();
    let mut taken = record.clone();
    taken.owner_id = bob.id.clone();
    assert!(matches!(
        session.update(taken),
        Err(ServiceError::Ledger(LedgerError::NotFound(_)))
    ));
    assert!(matches!(
        session.delete(&record.id),
        Err(ServiceError::Ledger(LedgerError::NotFound(_)))
    ));
    assert!(session.transactions().is_empty());

    let owned = session.backend().fetch_transactions(&alice.id).unwrap();
    assert_eq!(owned, vec![record]);
}
