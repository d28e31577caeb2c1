pub mod category;
pub mod transaction;
pub mod user;

pub use category::Category;
pub use transaction::{
    InvalidTransaction, Transaction, TransactionDraft, TransactionId, TransactionKind, UserId,
};
pub use user::{AuthState, User};
