//! CSV adapters for batch input and card reports.

pub mod card_writer;
pub mod operation_reader;
