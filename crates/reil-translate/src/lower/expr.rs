// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Expression lowering - flattens nested typed expressions into
//! three-address instructions, returning a leaf operand for each
//! subexpression.

use reil_bil::{BinOp, Exp, UnOp};
use reil_ir::{InstFlags, Opcode, Operand, Width};

use crate::error::{Result, TranslateError};
use crate::lower::BlockTranslator;

/// How an upstream binary operator reaches the target opcode set.
enum BinOpLowering {
    Direct(Opcode),
    Arshift,
    Neq,
    Le,
    Unsupported,
}

/// Upstream operator table, in upstream enumeration order.
fn binop_lowering(op: BinOp) -> BinOpLowering {
    match op {
        BinOp::Plus => BinOpLowering::Direct(Opcode::Add),
        BinOp::Minus => BinOpLowering::Direct(Opcode::Sub),
        BinOp::Times => BinOpLowering::Direct(Opcode::Mul),
        BinOp::Divide => BinOpLowering::Direct(Opcode::Div),
        BinOp::Mod => BinOpLowering::Direct(Opcode::Mod),
        BinOp::LShift => BinOpLowering::Direct(Opcode::Shl),
        BinOp::RShift => BinOpLowering::Direct(Opcode::Shr),
        BinOp::ARShift => BinOpLowering::Arshift,
        BinOp::LRotate | BinOp::RRotate => BinOpLowering::Unsupported,
        BinOp::LogicAnd => BinOpLowering::Direct(Opcode::And),
        BinOp::LogicOr => BinOpLowering::Direct(Opcode::Or),
        BinOp::BitAnd => BinOpLowering::Direct(Opcode::And),
        BinOp::BitOr => BinOpLowering::Direct(Opcode::Or),
        BinOp::Xor => BinOpLowering::Direct(Opcode::Xor),
        BinOp::Eq => BinOpLowering::Direct(Opcode::Eq),
        BinOp::Neq => BinOpLowering::Neq,
        BinOp::Gt | BinOp::Ge => BinOpLowering::Unsupported,
        BinOp::Lt => BinOpLowering::Direct(Opcode::Lt),
        BinOp::Le => BinOpLowering::Le,
        BinOp::SDivide => BinOpLowering::Direct(Opcode::Sdiv),
        BinOp::SMod => BinOpLowering::Direct(Opcode::Smod),
    }
}

/// Map a bit count onto an operand width.
pub(crate) fn operand_width(bits: u32) -> Result<Width> {
    Width::from_bits(bits).ok_or(TranslateError::InvalidOperandSize(bits))
}

/// Width of a lowered leaf operand.
pub(crate) fn width_of(op: &Operand) -> Width {
    op.width().unwrap_or(Width::W1)
}

impl BlockTranslator<'_> {
    /// Lower an expression to a leaf operand, emitting instructions for
    /// compound forms. Results of compound forms land in fresh
    /// temporaries.
    pub(crate) fn lower_exp(&mut self, exp: &Exp) -> Result<Operand> {
        if exp.is_leaf() {
            self.leaf_operand(exp)
        } else {
            self.lower_exp_into(exp, None, InstFlags::NONE)
        }
    }

    /// Lower an expression, directing the result into `dst` when given.
    /// `flags` land on the final emitted instruction. Returns the operand
    /// holding the result.
    pub(crate) fn lower_exp_into(
        &mut self,
        exp: &Exp,
        dst: Option<Operand>,
        flags: InstFlags,
    ) -> Result<Operand> {
        match exp {
            Exp::BinOp { op, lhs, rhs } => self.lower_binop(*op, lhs, rhs, dst, flags),
            Exp::UnOp { op, exp: inner } => {
                let a = self.lower_exp(inner)?;
                let opcode = match op {
                    UnOp::Neg => Opcode::Neg,
                    UnOp::Not => Opcode::Not,
                };
                let c = match dst {
                    Some(c) => c,
                    None => self.fresh_result(width_of(&a)),
                };
                self.emit(opcode, a, Operand::None, c.clone(), flags);
                Ok(c)
            }
            Exp::Cast { kind, bits, exp: inner } => {
                let a = self.lower_exp(inner)?;
                let c = match dst {
                    Some(c) => c,
                    None => {
                        let width = operand_width(*bits)?;
                        self.fresh_result(width)
                    }
                };
                self.lower_cast(*kind, a, c.clone(), flags)?;
                Ok(c)
            }
            Exp::Mem { bits, addr } => {
                let a = self.lower_exp(addr)?;
                let c = match dst {
                    Some(c) => c,
                    None => {
                        let width = operand_width(*bits)?;
                        self.fresh_result(width)
                    }
                };
                self.emit(Opcode::Ldm, a, Operand::None, c.clone(), flags);
                Ok(c)
            }
            Exp::Name(name) => Err(TranslateError::InvalidExpression(format!(
                "symbolic name `{name}` outside a jump target"
            ))),
            leaf => {
                let a = self.leaf_operand(leaf)?;
                match dst {
                    Some(c) => {
                        self.emit(Opcode::Str, a, Operand::None, c.clone(), flags);
                        Ok(c)
                    }
                    None => Ok(a),
                }
            }
        }
    }

    fn lower_binop(
        &mut self,
        op: BinOp,
        lhs: &Exp,
        rhs: &Exp,
        dst: Option<Operand>,
        flags: InstFlags,
    ) -> Result<Operand> {
        let a = self.lower_exp(lhs)?;
        let b = self.lower_exp(rhs)?;

        if matches!(op, BinOp::LogicAnd | BinOp::LogicOr)
            && (width_of(&a) != Width::W1 || width_of(&b) != Width::W1)
        {
            return Err(TranslateError::InvalidExpression(format!(
                "logic operator {op:?} over operands wider than one bit"
            )));
        }

        match binop_lowering(op) {
            BinOpLowering::Direct(opcode) => {
                let c = match dst {
                    Some(c) => c,
                    None => self.fresh_result(direct_result_width(opcode, &a)),
                };
                self.emit(opcode, a, b, c.clone(), flags);
                Ok(c)
            }
            BinOpLowering::Arshift => {
                let c = match dst {
                    Some(c) => c,
                    None => self.fresh_result(width_of(&a)),
                };
                self.synth_arshift(a, b, c.clone(), flags);
                Ok(c)
            }
            BinOpLowering::Neq => {
                let c = match dst {
                    Some(c) => c,
                    None => self.fresh_result(Width::W1),
                };
                self.synth_neq(a, b, c.clone(), flags);
                Ok(c)
            }
            BinOpLowering::Le => {
                let c = match dst {
                    Some(c) => c,
                    None => self.fresh_result(Width::W1),
                };
                self.synth_le(a, b, c.clone(), flags);
                Ok(c)
            }
            BinOpLowering::Unsupported => Err(TranslateError::UnsupportedOperator(op)),
        }
    }

    /// Convert a leaf expression into an operand.
    ///
    /// Register-shaped names map by prefix: `R_` is architectural, `V_` is
    /// already a scratch slot, anything else is a lifter temporary and is
    /// bound to a slot. Touching the architecture's flags pseudo-register
    /// expands it first, once.
    pub(crate) fn leaf_operand(&mut self, exp: &Exp) -> Result<Operand> {
        match exp {
            Exp::Const { bits, value } => {
                Ok(Operand::constant(operand_width(*bits)?, *value))
            }
            Exp::Relative { bits, offset } => Ok(Operand::constant(
                operand_width(*bits)?,
                self.raw.addr.wrapping_add(*offset),
            )),
            Exp::Reg { bits, name } | Exp::Temp { bits, name } => {
                let width = operand_width(*bits)?;
                if name.starts_with("R_") {
                    if Some(name.as_str()) == self.arch.flag_register() && !self.expanding_flags
                    {
                        self.expand_flag_register()?;
                    }
                    Ok(Operand::reg(width, name))
                } else if name.starts_with("V_") {
                    Ok(Operand::temp(width, name))
                } else {
                    let slot = self.tempregs.name_for(name);
                    Ok(Operand::temp(width, &slot))
                }
            }
            other => Err(TranslateError::InvalidExpression(format!(
                "expected a leaf operand, found {other}"
            ))),
        }
    }

    /// Run the architecture's flag-expansion statements through the
    /// statement lowerer. The guard keeps mentions of the flags register
    /// inside the expansion from re-entering.
    fn expand_flag_register(&mut self) -> Result<()> {
        let stmts = self.arch.expand_flags();
        self.expanding_flags = true;
        let result = stmts
            .iter()
            .try_for_each(|s| self.lower_stmt(s, InstFlags::NONE));
        self.expanding_flags = false;
        result
    }
}

/// Width of a fresh destination for a directly-mapped operator:
/// comparisons produce one bit, everything else the first operand's width.
fn direct_result_width(opcode: Opcode, a: &Operand) -> Width {
    match opcode {
        Opcode::Eq | Opcode::Lt => Width::W1,
        _ => width_of(a),
    }
}
