//! Application layer orchestrating card operations against a store.
//!
//! `CardService` loads cards, applies the domain operations and persists the
//! results. `BatchProcessor` drives the service from batch rows that refer to
//! cards by caller-chosen references.

pub mod batch;
pub mod service;
