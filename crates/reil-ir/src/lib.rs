// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! REIL target IR - linear three-address instructions over typed operands.
//!
//! Every instruction is a `(opcode, a, b, c)` tuple plus per-instruction
//! metadata: the index within the originating machine instruction (`inum`),
//! option flags, and the raw machine-code information shared by all
//! instructions lowered from one machine instruction.

mod display;
mod inst;
mod operand;
mod width;

pub use inst::{InstFlags, Instruction, Opcode, RawInfo};
pub use operand::{Operand, MAX_NAME_LEN};
pub use width::Width;
