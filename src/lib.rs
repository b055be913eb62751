//! Payment card issuance and lifecycle engine.
//!
//! The [`domain`] module holds the card rules: number generation, balance
//! limits, and the Active/Blocked/Expired lifecycle. [`application`] wires
//! them to a [`domain::ports::CardStore`], and [`interfaces`] reads and writes
//! CSV batches for the command-line tool.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
