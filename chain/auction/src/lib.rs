//! Batch-Auction Ledger
//!
//! Records buy/sell interest in a synthetic asset, matches takers immediately
//! against an external reference price, queues passive volume and lets its
//! owners cancel or claim their filled share later.
//!
//! # Modules
//! - `predecessor`: Digit-trie predecessor index over integer keys
//! - `orders`: Append-only cumulative-volume order ledger
//! - `fills`: Price-tagged fill ticks and average-price queries
//! - `cancellations`: Per-order cancelled (phantom) volume
//! - `engine`: One side's ledger: placement, matching, cancellation, claims
//! - `pair`: Buy/sell ledger pair with excess routing
//! - `host`: Oracle, custody and permission collaborator traits
//! - `vault`, `oracle`, `security`: In-memory collaborators
//! - `config`, `events`, `errors`: Configuration, event log, error types
//!
//! # Version
//! v0.1.0

pub mod cancellations;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod fills;
pub mod host;
pub mod oracle;
pub mod orders;
pub mod pair;
pub mod predecessor;
pub mod security;
pub mod vault;

pub use config::{AuctionConfig, PairConfig};
pub use engine::{BatchAuction, OrderInfo, PlaceOutcome};
pub use errors::AuctionError;
pub use host::Host;
pub use pair::AuctionPair;

/// Event schema version; bump on any breaking change to `events`
pub const EVENT_SCHEMA_VERSION: &str = "1.0.0";
