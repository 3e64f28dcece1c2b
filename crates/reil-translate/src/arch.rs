// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Architecture collaborators.
//!
//! The translator core is architecture-agnostic; everything
//! machine-specific comes in through the [`Arch`] trait: the code address
//! width, expansion of the flags pseudo-register into its constituent
//! bits, and operand probing for instructions the lifter could not
//! translate.

use reil_bil::{BinOp, CastKind, Exp, Stmt};
use reil_ir::Width;

/// Register operands of a machine instruction the lifter rejected,
/// reported by a disassembler. Names are paired with widths in bits.
#[derive(Debug, Clone, Default)]
pub struct UnknownArgs {
    pub src: Vec<(String, u32)>,
    pub dst: Vec<(String, u32)>,
}

impl UnknownArgs {
    pub fn is_empty(&self) -> bool {
        self.src.is_empty() && self.dst.is_empty()
    }
}

/// Architecture-specific collaborator of the translator.
pub trait Arch {
    fn name(&self) -> &'static str;

    /// Width of code addresses; resolved jump targets are emitted at this
    /// width.
    fn addr_width(&self) -> Width;

    /// Pseudo-register mirroring the processor flags, if the architecture
    /// has one. Reads and writes of it trigger [`Arch::expand_flags`].
    fn flag_register(&self) -> Option<&str> {
        None
    }

    /// Statements reconstructing the flags pseudo-register from its
    /// constituent one-bit registers.
    fn expand_flags(&self) -> Vec<Stmt> {
        Vec::new()
    }

    /// Source and destination registers of an instruction the lifter
    /// rejected. The default reports none; attach a disassembler by
    /// overriding this.
    fn unknown_args(&self, bytes: &[u8]) -> UnknownArgs {
        let _ = bytes;
        UnknownArgs::default()
    }
}

/// 32-bit x86.
pub struct X86;

impl Arch for X86 {
    fn name(&self) -> &'static str {
        "x86"
    }

    fn addr_width(&self) -> Width {
        Width::W32
    }

    fn flag_register(&self) -> Option<&str> {
        Some("R_EFLAGS")
    }

    fn expand_flags(&self) -> Vec<Stmt> {
        flag_register_stmts(32, "R_EFLAGS")
    }
}

/// 64-bit x86.
pub struct X64;

impl Arch for X64 {
    fn name(&self) -> &'static str {
        "x86-64"
    }

    fn addr_width(&self) -> Width {
        Width::W64
    }

    fn flag_register(&self) -> Option<&str> {
        Some("R_RFLAGS")
    }

    fn expand_flags(&self) -> Vec<Stmt> {
        flag_register_stmts(64, "R_RFLAGS")
    }
}

/// 32-bit ARM. Condition flags are plain one-bit registers here, so there
/// is nothing to expand.
pub struct Arm;

impl Arch for Arm {
    fn name(&self) -> &'static str {
        "arm"
    }

    fn addr_width(&self) -> Width {
        Width::W32
    }
}

/// Statements composing the x86 flags register from the one-bit flag
/// registers at their architectural positions: CF at 0, PF at 2, AF at 4,
/// ZF at 6, SF at 7, OF at 11. Bit 1 always reads as set.
fn flag_register_stmts(bits: u32, reg: &str) -> Vec<Stmt> {
    const FLAG_BITS: [(&str, u64); 6] = [
        ("R_CF", 0),
        ("R_PF", 2),
        ("R_AF", 4),
        ("R_ZF", 6),
        ("R_SF", 7),
        ("R_OF", 11),
    ];

    let acc = || Exp::temp(bits, "flags_acc");
    let bit = |name: &str, shift: u64| {
        let wide = Exp::cast(CastKind::Unsigned, bits, Exp::reg(1, name));
        if shift == 0 {
            wide
        } else {
            Exp::binop(BinOp::LShift, wide, Exp::constant(bits, shift))
        }
    };

    let mut stmts = Vec::with_capacity(FLAG_BITS.len() + 1);
    for (i, (name, shift)) in FLAG_BITS.iter().enumerate() {
        let value = bit(name, *shift);
        let rhs = if i == 0 {
            value
        } else {
            Exp::binop(BinOp::BitOr, acc(), value)
        };
        stmts.push(Stmt::assign(acc(), rhs));
    }
    stmts.push(Stmt::assign(
        Exp::reg(bits, reg),
        Exp::binop(BinOp::BitOr, acc(), Exp::constant(bits, 0x2)),
    ));
    stmts
}
