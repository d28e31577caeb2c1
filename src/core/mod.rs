//! Services and session state that sit between storage and presentation.

pub mod services;
pub mod session;
pub mod time;
pub mod utils;

pub use session::ExpenseSession;
