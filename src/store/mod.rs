//! Token store: a single JSON file holding both platforms' OAuth credentials.
//!
//! The file is the source of truth. Nothing is cached in memory between
//! calls, so every client reads the latest record before deciding whether to
//! refresh.

pub mod file;
pub mod refresh;

pub use file::{Platform, TokenRecord, TokenStore, TokenStoreDocument};
pub use refresh::{ensure_access_token, exchange_and_store, now_millis};
