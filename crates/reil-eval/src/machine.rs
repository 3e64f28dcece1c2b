// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! The evaluation machine.

use std::collections::HashMap;

use reil_ir::{Instruction, Opcode, Operand, Width};
use thiserror::Error;

/// Evaluation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero at {0:#x}.{1:02}")]
    DivisionByZero(u64, u16),
    #[error("instruction writes to a non-register operand at {0:#x}.{1:02}")]
    BadDestination(u64, u16),
    #[error("instruction reads an absent operand at {0:#x}.{1:02}")]
    BadSource(u64, u16),
}

/// Interpret `value` of width `w` as a signed quantity.
pub fn sign_extend(value: u64, w: Width) -> i64 {
    let shift = 64 - w.bits();
    ((value << shift) as i64) >> shift
}

/// Register file plus byte-addressed memory.
///
/// Registers and temporaries live in one name-keyed map; unwritten names
/// read as zero.
#[derive(Debug, Default)]
pub struct Machine {
    regs: HashMap<String, u64>,
    mem: HashMap<u64, u8>,
    branch: Option<u64>,
}

impl Machine {
    pub fn new() -> Machine {
        Machine::default()
    }

    /// Set a register, masking the value to `width`.
    pub fn set(&mut self, name: &str, width: Width, value: u64) {
        self.regs.insert(name.to_string(), value & width.mask());
    }

    /// Current value of a register; zero if never written.
    pub fn get(&self, name: &str) -> u64 {
        self.regs.get(name).copied().unwrap_or(0)
    }

    /// Write `width` bits of `value` at `addr`, little-endian.
    pub fn store(&mut self, addr: u64, width: Width, value: u64) {
        let value = value & width.mask();
        for i in 0..byte_len(width) {
            self.mem
                .insert(addr.wrapping_add(i as u64), (value >> (8 * i)) as u8);
        }
    }

    /// Read `width` bits at `addr`, little-endian.
    pub fn load(&self, addr: u64, width: Width) -> u64 {
        let mut value = 0u64;
        for i in 0..byte_len(width) {
            let byte = self.mem.get(&addr.wrapping_add(i as u64)).copied().unwrap_or(0);
            value |= (byte as u64) << (8 * i);
        }
        value & width.mask()
    }

    /// Target of the last taken jump, if any.
    pub fn taken_branch(&self) -> Option<u64> {
        self.branch
    }

    /// Execute a sequence in order.
    pub fn run(&mut self, insts: &[Instruction]) -> Result<(), EvalError> {
        for inst in insts {
            self.exec(inst)?;
        }
        Ok(())
    }

    /// Execute a single instruction.
    pub fn exec(&mut self, inst: &Instruction) -> Result<(), EvalError> {
        match inst.op {
            Opcode::None | Opcode::Unk => Ok(()),
            Opcode::Str => {
                let a = self.read(&inst.a, inst)?;
                self.write(&inst.c, a, inst)
            }
            Opcode::Jcc => {
                let cond = self.read(&inst.c, inst)?;
                if cond != 0 {
                    self.branch = Some(self.read(&inst.a, inst)?);
                }
                Ok(())
            }
            Opcode::Ldm => {
                let addr = self.read(&inst.a, inst)?;
                let width = inst.c.width().ok_or(bad_dest(inst))?;
                let value = self.load(addr, width);
                self.write(&inst.c, value, inst)
            }
            Opcode::Stm => {
                let value = self.read(&inst.a, inst)?;
                let width = inst.a.width().ok_or(bad_src(inst))?;
                let addr = self.read(&inst.c, inst)?;
                self.store(addr, width, value);
                Ok(())
            }
            Opcode::Neg => {
                let a = self.read(&inst.a, inst)?;
                self.write(&inst.c, a.wrapping_neg(), inst)
            }
            Opcode::Not => {
                let a = self.read(&inst.a, inst)?;
                self.write(&inst.c, !a, inst)
            }
            _ => {
                let a = self.read(&inst.a, inst)?;
                let b = self.read(&inst.b, inst)?;
                let value = self.binary(inst, a, b)?;
                self.write(&inst.c, value, inst)
            }
        }
    }

    fn binary(&self, inst: &Instruction, a: u64, b: u64) -> Result<u64, EvalError> {
        let a_width = inst.a.width().ok_or(bad_src(inst))?;
        let b_width = inst.b.width().unwrap_or(a_width);
        let value = match inst.op {
            Opcode::Add => a.wrapping_add(b),
            Opcode::Sub => a.wrapping_sub(b),
            Opcode::Mul => a.wrapping_mul(b),
            Opcode::Div => {
                if b == 0 {
                    return Err(div_zero(inst));
                }
                a / b
            }
            Opcode::Mod => {
                if b == 0 {
                    return Err(div_zero(inst));
                }
                a % b
            }
            Opcode::Smul => {
                sign_extend(a, a_width).wrapping_mul(sign_extend(b, b_width)) as u64
            }
            Opcode::Sdiv => {
                if b == 0 {
                    return Err(div_zero(inst));
                }
                sign_extend(a, a_width).wrapping_div(sign_extend(b, b_width)) as u64
            }
            Opcode::Smod => {
                if b == 0 {
                    return Err(div_zero(inst));
                }
                sign_extend(a, a_width).wrapping_rem(sign_extend(b, b_width)) as u64
            }
            Opcode::Shl => shifted(a, b, true),
            Opcode::Shr => shifted(a, b, false),
            Opcode::And => a & b,
            Opcode::Or => a | b,
            Opcode::Xor => a ^ b,
            Opcode::Eq => (a == b) as u64,
            Opcode::Lt => (a < b) as u64,
            _ => unreachable!("non-binary opcode {:?}", inst.op),
        };
        Ok(value)
    }

    fn read(&self, op: &Operand, inst: &Instruction) -> Result<u64, EvalError> {
        match op {
            Operand::None => Err(bad_src(inst)),
            Operand::Const { value, .. } => Ok(*value),
            Operand::Reg { name, .. } | Operand::Temp { name, .. } => Ok(self.get(name)),
        }
    }

    fn write(&mut self, op: &Operand, value: u64, inst: &Instruction) -> Result<(), EvalError> {
        match op {
            Operand::Reg { width, name } | Operand::Temp { width, name } => {
                self.regs.insert(name.clone(), value & width.mask());
                Ok(())
            }
            _ => Err(bad_dest(inst)),
        }
    }
}

fn byte_len(width: Width) -> u32 {
    match width {
        Width::W1 => 1,
        w => w.bits() / 8,
    }
}

/// Shift with the REIL convention that over-long counts drain to zero.
fn shifted(value: u64, count: u64, left: bool) -> u64 {
    if count >= 64 {
        return 0;
    }
    if left {
        value << count
    } else {
        value >> count
    }
}

fn div_zero(inst: &Instruction) -> EvalError {
    EvalError::DivisionByZero(inst.raw.addr, inst.inum)
}

fn bad_dest(inst: &Instruction) -> EvalError {
    EvalError::BadDestination(inst.raw.addr, inst.inum)
}

fn bad_src(inst: &Instruction) -> EvalError {
    EvalError::BadSource(inst.raw.addr, inst.inum)
}
