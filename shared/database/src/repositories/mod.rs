//! Repository module for database read operations
//!
//! Provides typed repository implementations for the purchase history.

pub mod purchase;

pub use purchase::PurchaseHistoryRepository;
