#![deny(missing_docs)]
//! Mediavault core library.
//!
//! Domain logic for the media archive bot: the file record store, the
//! interactive classification dialogue, the distribution routing table and
//! caption search.

/// Inline button payload grammar.
pub mod callback;
/// Classification state machine and sub-flows.
pub mod classify;
/// Configuration management.
pub mod config;
/// Button-press dispatch and authorization.
pub mod dispatch;
/// Error taxonomy.
pub mod error;
/// Outbound send operations seam.
pub mod gateway;
/// Inline keyboard construction.
pub mod keyboards;
/// Ephemeral prompt and partial-date tracking.
pub mod prompts;
/// The persisted file record model.
pub mod record;
/// Distribution routing.
pub mod router;
/// Caption substring search.
pub mod search;
/// Record store trait and backends.
pub mod store;
/// Test doubles shared by unit and integration tests.
pub mod testing;
/// Small shared helpers.
pub mod utils;
