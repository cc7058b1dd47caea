//! # Integration Tests
//!
//! End-to-end ledger flows over the in-memory custodian and broadcast bus.
