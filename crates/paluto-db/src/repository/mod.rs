//! # Repository Module
//!
//! Database repository implementations for Paluto POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service Operation                                                     │
//! │       │                                                                 │
//! │       │  db.orders().items_for_transaction("A1B2C3D4")                 │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── items_for_transaction(&self, txn)                                 │
//! │  ├── insert_items(&self, items)                                        │
//! │  ├── delete_pending(&self, txn)                                        │
//! │  └── set_status(&self, txn, status)                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Easy to test against an in-memory database                          │
//! │  • Clear separation of concerns                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Menu CRUD
//! - [`order::OrderRepository`] - Order ledger operations
//! - [`payment::PaymentRepository`] - Payment recording and totals

pub mod order;
pub mod payment;
pub mod product;
