//! Shared types for the batch-auction ledger
//!
//! Identifiers, order sides and the fixed-point helpers used to convert
//! between ledger volume and token amounts at a reference price.
//!
//! # Modules
//! - `ids`: Account and asset identifiers
//! - `order`: Order side
//! - `numeric`: Price decoding and price × volume conversions
//! - `errors`: Numeric error type

pub mod ids;
pub mod order;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "0.1.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
}
