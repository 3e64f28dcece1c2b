// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Block lowering - drives statement and expression lowering over one
//! lifted machine instruction.

mod expr;
mod stmt;
mod synth;

use log::{debug, warn};

use reil_bil::{Block, Stmt};
use reil_ir::{InstFlags, Instruction, Opcode, Operand, RawInfo, Width};

use crate::arch::Arch;
use crate::config::TranslatorConfig;
use crate::error::Result;
use crate::sink::Sink;
use crate::tempreg::TempAlloc;

/// Prefix of the lifter annotation marking an instruction the lifter
/// could not translate.
pub const UNKNOWN_INSN_TAG: &str = "Unknown: ";

/// Lowers one lifted machine instruction into target instructions.
///
/// Holds the per-block state: the scratch-register namespace, the target
/// instruction counter, the flag-expansion guard, and the raw machine-code
/// metadata stamped onto emitted instructions. The state lives exactly as
/// long as one machine instruction; create a fresh translator per block.
pub struct BlockTranslator<'a> {
    arch: &'a dyn Arch,
    config: TranslatorConfig,
    sink: &'a mut dyn Sink,
    block: &'a Block,
    raw: RawInfo,
    stmt_idx: usize,
    tempregs: TempAlloc,
    inst_count: u16,
    expanding_flags: bool,
}

impl<'a> BlockTranslator<'a> {
    pub fn new(
        arch: &'a dyn Arch,
        config: TranslatorConfig,
        sink: &'a mut dyn Sink,
        raw: RawInfo,
        block: &'a Block,
    ) -> BlockTranslator<'a> {
        BlockTranslator {
            arch,
            config,
            sink,
            block,
            raw,
            stmt_idx: 0,
            tempregs: TempAlloc::new(config.trace_tempreg),
            inst_count: 0,
            expanding_flags: false,
        }
    }

    /// Lower the whole block. Every machine instruction produces at least
    /// one target instruction, and exactly one of them carries
    /// [`InstFlags::ASM_END`].
    pub fn run(mut self) -> Result<()> {
        let block = self.block;

        if block.stmts.iter().any(is_unknown_marker) {
            warn!("{:#x} was not translated", self.raw.addr);
            self.unknown_insn()?;
            return Ok(());
        }

        for (i, s) in block.stmts.iter().enumerate() {
            self.stmt_idx = i;

            let mut flags = if self.is_tail(i) {
                InstFlags::ASM_END
            } else {
                InstFlags::NONE
            };
            if let Some(Stmt::Special(tag)) = block.stmts.get(i + 1) {
                flags |= special_flags(tag);
            }

            if self.config.trace_bil {
                debug!("{}", s);
            }
            self.lower_stmt(s, flags)?;
        }

        if self.inst_count == 0 {
            self.empty_insn();
        }
        Ok(())
    }

    /// Whether no statement after `idx` emits target instructions, i.e.
    /// whether `idx` sits in the `ASM_END` tail of the block.
    fn is_tail(&self, idx: usize) -> bool {
        !self.block.stmts[idx + 1..].iter().any(Stmt::is_emitting)
    }

    /// Resolve a symbolic jump target to a code address.
    ///
    /// `pc_0x...` names encode the address directly. Anything else must be
    /// a label in the block tail, which by convention refers to the next
    /// machine instruction.
    pub(crate) fn resolve_label(&self, name: &str) -> Result<u64> {
        use crate::error::TranslateError;

        if let Some(hex) = name.strip_prefix("pc_0x") {
            return u64::from_str_radix(hex, 16)
                .map_err(|_| TranslateError::UnresolvedLabel(name.to_string()));
        }

        for (i, s) in self.block.stmts.iter().enumerate() {
            if let Stmt::Label(label) = s {
                if label == name {
                    if !self.is_tail(i) {
                        return Err(TranslateError::MidInstructionLabel(name.to_string()));
                    }
                    let addr = self.raw.addr + u64::from(self.raw.size);
                    if self.config.trace_bil {
                        debug!("{} resolves to {:#x}", name, addr);
                    }
                    return Ok(addr);
                }
            }
        }

        Err(TranslateError::UnresolvedLabel(name.to_string()))
    }

    /// Emit one target instruction. Assigns the next `inum`; the first
    /// instruction of the block additionally carries the disassembly text
    /// and raw bytes.
    pub(crate) fn emit(
        &mut self,
        op: Opcode,
        a: Operand,
        b: Operand,
        c: Operand,
        flags: InstFlags,
    ) {
        let mut raw = RawInfo {
            addr: self.raw.addr,
            size: self.raw.size,
            ..RawInfo::default()
        };
        if self.inst_count == 0 {
            raw.mnemonic = self.raw.mnemonic.clone();
            raw.operands_text = self.raw.operands_text.clone();
            raw.bytes = self.raw.bytes.clone();
        }

        let inst = Instruction {
            op,
            a,
            b,
            c,
            inum: self.inst_count,
            flags,
            raw,
        };
        self.inst_count += 1;
        self.sink.emit(&inst);
    }

    /// Fresh anonymous result temporary.
    pub(crate) fn fresh_result(&mut self, width: Width) -> Operand {
        Operand::temp(width, &TempAlloc::slot_name(self.tempregs.alloc()))
    }

    /// Scratch temporary for synthesis sequences, keyed by the pending
    /// instruction number so repeated synthesis within one block never
    /// reuses a name.
    pub(crate) fn synth_temp(&mut self, width: Width) -> Operand {
        let key = format!("V_REIL_TMP_{}", self.inst_count);
        let name = self.tempregs.name_for(&key);
        Operand::temp(width, &name)
    }

    /// Emit the placeholder instruction for a machine instruction whose
    /// lowering produced nothing.
    fn empty_insn(&mut self) {
        self.emit(
            Opcode::None,
            Operand::None,
            Operand::None,
            Operand::None,
            InstFlags::ASM_END,
        );
    }

    /// Emit `UNK` instructions describing an untranslatable machine
    /// instruction: one per source/destination register the disassembler
    /// reports, or a single bare `UNK` when it reports none.
    fn unknown_insn(&mut self) -> Result<()> {
        use crate::error::TranslateError;

        let args = self.arch.unknown_args(&self.raw.bytes);
        if args.is_empty() {
            self.emit(
                Opcode::Unk,
                Operand::None,
                Operand::None,
                Operand::None,
                InstFlags::ASM_END,
            );
            return Ok(());
        }

        let total = args.src.len() + args.dst.len();
        let regs = args
            .src
            .iter()
            .map(|arg| (arg, true))
            .chain(args.dst.iter().map(|arg| (arg, false)));

        for (i, ((name, bits), is_src)) in regs.enumerate() {
            let width = Width::from_bits(*bits)
                .ok_or(TranslateError::InvalidOperandSize(*bits))?;
            let reg = Operand::reg(width, name);
            let flags = if i + 1 == total {
                InstFlags::ASM_END
            } else {
                InstFlags::NONE
            };
            if is_src {
                self.emit(Opcode::Unk, reg, Operand::None, Operand::None, flags);
            } else {
                self.emit(Opcode::Unk, Operand::None, Operand::None, reg, flags);
            }
        }
        Ok(())
    }
}

fn is_unknown_marker(s: &Stmt) -> bool {
    matches!(s, Stmt::Special(tag) if tag.starts_with(UNKNOWN_INSN_TAG))
}

/// Instruction flags contributed by a lifter annotation.
fn special_flags(tag: &str) -> InstFlags {
    match tag {
        "call" => InstFlags::CALL,
        "ret" => InstFlags::RET,
        _ => InstFlags::NONE,
    }
}
