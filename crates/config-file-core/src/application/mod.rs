//! Application layer: the config file accessor.
//!
//! # Sub-modules
//!
//! - **`builder`**  – Captures a config file definition and validates that it
//!   can always produce a value for an absent key.
//! - **`accessor`** – The read-modify-write protocol over the backing file.
//! - **`logger`**   – Per-event-kind callback table and dispatch.
//! - **`error`**    – The error type shared by every operation.

pub mod accessor;
pub mod builder;
pub mod error;
pub mod logger;
