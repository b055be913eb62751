//! Card lifecycle rules and the value objects they are built from.
//!
//! Nothing in this module performs I/O or logs; time and randomness are
//! passed in by the caller.

pub mod card;
pub mod clock;
pub mod money;
pub mod number;
pub mod operation;
pub mod ports;
