#![doc(test(attr(deny(warnings))))]

//! Expense Core tracks income and expense transactions for a single user and
//! derives the balance, per-category and monthly views a finance client renders.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod demo;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
