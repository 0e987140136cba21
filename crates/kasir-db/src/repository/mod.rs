//! # Repository Module
//!
//! Database repository implementations for Kasir.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  kasir-service                                                         │
//! │       │                                                                 │
//! │       │  db.products().list_page(search, warehouse, offset, limit)     │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list_page / count                                                 │
//! │  ├── get / get_many                                                    │
//! │  ├── insert / update / delete                                          │
//! │  └── stock_by_warehouse / import                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`WarehouseRepository`](warehouse::WarehouseRepository) - Warehouse CRUD and delete guard
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, paging, stock summary
//! - [`UserRepository`](user::UserRepository) - Users and credentials
//! - [`TransactionRepository`](transaction::TransactionRepository) - Atomic posting and reports

pub mod product;
pub mod transaction;
pub mod user;
pub mod warehouse;
