//! # Domain Module
//!
//! Core domain types for the escrow ledger.

pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod preimage;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use invariants::*;
pub use preimage::Preimage;
pub use value_objects::*;
