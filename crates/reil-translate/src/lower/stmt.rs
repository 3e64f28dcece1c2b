// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Statement lowering - dispatch on the lifted statement kind.

use log::debug;

use reil_bil::{Exp, Stmt};
use reil_ir::{InstFlags, Opcode, Operand, Width};

use crate::error::{Result, TranslateError};
use crate::lower::BlockTranslator;

impl BlockTranslator<'_> {
    /// Lower one statement. `flags` land on the final instruction the
    /// statement emits.
    pub(crate) fn lower_stmt(&mut self, s: &Stmt, flags: InstFlags) -> Result<()> {
        match s {
            Stmt::Assign { lhs, rhs } => self.lower_assign(lhs, rhs, flags),
            Stmt::Jmp { target } => self.lower_jmp(target, flags),
            Stmt::CJmp { cond, t_target, f_target } => {
                self.lower_cjmp(cond, t_target, f_target, flags)
            }
            Stmt::Label(name) => {
                if self.config.trace_bil {
                    // A label in the block tail belongs to the next
                    // machine instruction.
                    let (addr, inum) = if flags.contains(InstFlags::ASM_END) {
                        (self.raw.addr + u64::from(self.raw.size), 0)
                    } else {
                        (self.raw.addr, self.inst_count)
                    };
                    debug!("label {} at {:#x}.{:02}", name, addr, inum);
                }
                Ok(())
            }
            Stmt::Special(_) | Stmt::Comment(_) | Stmt::ExpStmt(_) | Stmt::VarDecl { .. } => {
                Ok(())
            }
            Stmt::Call { .. } => Err(TranslateError::UnimplementedStatement("call")),
            Stmt::Return(_) => Err(TranslateError::UnimplementedStatement("return")),
        }
    }

    /// Assignment: drive expression lowering with the destination, or
    /// emit a store when the destination is a memory location.
    fn lower_assign(&mut self, lhs: &Exp, rhs: &Exp, flags: InstFlags) -> Result<()> {
        if let Exp::Mem { addr, .. } = lhs {
            let addr_op = self.lower_exp(addr)?;
            let value = self.lower_exp(rhs)?;
            self.emit(Opcode::Stm, value, Operand::None, addr_op, flags);
            return Ok(());
        }

        let dst = self.leaf_operand(lhs)?;
        if matches!(dst, Operand::Const { .. } | Operand::None) {
            return Err(TranslateError::InvalidExpression(format!(
                "assignment destination {lhs} is not a register"
            )));
        }
        self.lower_exp_into(rhs, Some(dst), flags)?;
        Ok(())
    }

    /// Unconditional jump: an always-taken `JCC`. Ends the basic block
    /// unless the jump implements a call.
    fn lower_jmp(&mut self, target: &Exp, mut flags: InstFlags) -> Result<()> {
        if !flags.contains(InstFlags::CALL) {
            flags |= InstFlags::BB_END;
        }
        let target_op = self.jump_target(target)?;
        self.emit(
            Opcode::Jcc,
            target_op,
            Operand::None,
            Operand::constant(Width::W1, 1),
            flags,
        );
        Ok(())
    }

    /// Conditional jump. The condition must end up in a one-bit leaf; the
    /// false target must name the label that immediately follows, since
    /// the fall-through is the rest of the block.
    fn lower_cjmp(
        &mut self,
        cond: &Exp,
        t_target: &Exp,
        f_target: &Exp,
        flags: InstFlags,
    ) -> Result<()> {
        let target_op = self.jump_target(t_target)?;

        let cond_op = match cond {
            Exp::Reg { .. } | Exp::Temp { .. } => self.leaf_operand(cond)?,
            _ => {
                let tmp = self.synth_temp(Width::W1);
                self.lower_exp_into(cond, Some(tmp), InstFlags::NONE)?
            }
        };

        self.check_false_target(f_target)?;
        self.emit(
            Opcode::Jcc,
            target_op,
            Operand::None,
            cond_op,
            flags | InstFlags::BB_END,
        );
        Ok(())
    }

    /// Jump target operand: symbolic names resolve to a code address at
    /// the architecture's address width, anything else lowers as an
    /// expression.
    fn jump_target(&mut self, target: &Exp) -> Result<Operand> {
        match target {
            Exp::Name(name) => {
                let addr = self.resolve_label(name)?;
                Ok(Operand::constant(self.arch.addr_width(), addr))
            }
            _ => self.lower_exp(target),
        }
    }

    fn check_false_target(&self, f_target: &Exp) -> Result<()> {
        let name = match f_target {
            Exp::Name(name) => name,
            other => {
                return Err(TranslateError::UnexpectedCJmpFalseTarget(other.to_string()))
            }
        };
        match self.block.stmts.get(self.stmt_idx + 1) {
            Some(Stmt::Label(label)) if label == name => Ok(()),
            _ => Err(TranslateError::UnexpectedCJmpFalseTarget(name.clone())),
        }
    }
}
