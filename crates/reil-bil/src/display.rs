// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Display implementations for BIL nodes (statement tracing).

use std::fmt;

use crate::{BinOp, CastKind, Exp, Stmt, UnOp};

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Times => "*",
            BinOp::Divide => "/",
            BinOp::Mod => "%",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::ARShift => ">>a",
            BinOp::LRotate => "<<rot",
            BinOp::RRotate => ">>rot",
            BinOp::LogicAnd => "&&",
            BinOp::LogicOr => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::Xor => "^",
            BinOp::Eq => "==",
            BinOp::Neq => "<>",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Ge => ">=",
            BinOp::Le => "<=",
            BinOp::SDivide => "/$",
            BinOp::SMod => "%$",
        }
    }
}

impl CastKind {
    fn keyword(self) -> &'static str {
        match self {
            CastKind::Low => "low",
            CastKind::High => "high",
            CastKind::Unsigned => "unsigned",
            CastKind::Signed => "signed",
        }
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exp::Const { bits, value } => write!(f, "{:#x}:{}", value, bits),
            Exp::Reg { bits, name } | Exp::Temp { bits, name } => {
                write!(f, "{}:{}", name, bits)
            }
            Exp::Relative { offset, .. } => write!(f, "$+{:#x}", offset),
            Exp::BinOp { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Exp::UnOp { op, exp } => match op {
                UnOp::Neg => write!(f, "-({})", exp),
                UnOp::Not => write!(f, "~({})", exp),
            },
            Exp::Cast { kind, bits, exp } => {
                write!(f, "{}:{}({})", kind.keyword(), bits, exp)
            }
            Exp::Mem { bits, addr } => write!(f, "mem[{}]:{}", addr, bits),
            Exp::Name(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Stmt::Jmp { target } => write!(f, "jmp {}", target),
            Stmt::CJmp { cond, t_target, f_target } => {
                write!(f, "cjmp {}, {}, {}", cond, t_target, f_target)
            }
            Stmt::Label(name) => write!(f, "label {}", name),
            Stmt::Special(tag) => write!(f, "special \"{}\"", tag),
            Stmt::Comment(text) => write!(f, "// {}", text),
            Stmt::ExpStmt(exp) => write!(f, "{}", exp),
            Stmt::VarDecl { name, bits } => write!(f, "var {}:{}", name, bits),
            Stmt::Call { target } => write!(f, "call {}", target),
            Stmt::Return(None) => f.write_str("return"),
            Stmt::Return(Some(exp)) => write!(f, "return {}", exp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_rendering() {
        let e = Exp::binop(
            BinOp::Plus,
            Exp::reg(32, "R_EAX"),
            Exp::cast(CastKind::Unsigned, 32, Exp::temp(8, "V_01")),
        );
        assert_eq!(e.to_string(), "(R_EAX:32 + unsigned:32(V_01:8))");
    }

    #[test]
    fn statement_rendering() {
        let s = Stmt::assign(
            Exp::mem(32, Exp::reg(32, "R_ESP")),
            Exp::constant(32, 0xdead),
        );
        assert_eq!(s.to_string(), "mem[R_ESP:32]:32 = 0xdead:32");

        let s = Stmt::cjmp(
            Exp::temp(1, "V_00"),
            Exp::name("pc_0x1010"),
            Exp::name("L_next"),
        );
        assert_eq!(s.to_string(), "cjmp V_00:1, pc_0x1010, L_next");
    }
}
