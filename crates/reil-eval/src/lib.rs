// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Reference machine for REIL instruction sequences.
//!
//! Executes emitted target instructions over a flat register file and a
//! byte-addressed memory. Values are stored masked to the destination
//! width of the instruction that wrote them, so reads never see bits
//! beyond a register's declared width.

mod machine;

pub use machine::{sign_extend, EvalError, Machine};
