// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Display implementations for target IR types (textual dumps).

use std::fmt;

use crate::{Instruction, Opcode, Operand, Width};

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Const { width, value } => write!(f, "{:#x}:{}", value, width),
            Operand::Reg { width, name } | Operand::Temp { width, name } => {
                write!(f, "{}:{}", name, width)
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}.{:02} {:<4} {}, {}, {}",
            self.raw.addr,
            self.inum,
            self.op.name(),
            self.a,
            self.b,
            self.c
        )
    }
}
