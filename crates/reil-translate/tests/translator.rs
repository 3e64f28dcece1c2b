// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Translator driver tests over a scripted lifter.

use reil_bil::{BinOp, Block, Exp, Stmt};
use reil_ir::{InstFlags, Instruction, Opcode};
use reil_translate::{
    Collector, FnSink, LiftError, Lifter, TranslateError, Translator, TranslatorConfig, X86,
};

/// Lifter returning a canned block per call, regardless of the bytes.
struct ScriptedLifter {
    blocks: Vec<Result<Block, LiftError>>,
    next: usize,
}

impl ScriptedLifter {
    fn new(blocks: Vec<Result<Block, LiftError>>) -> ScriptedLifter {
        ScriptedLifter { blocks, next: 0 }
    }
}

impl Lifter for ScriptedLifter {
    fn lift(&mut self, _addr: u64, _bytes: &[u8]) -> Result<Block, LiftError> {
        let i = self.next.min(self.blocks.len() - 1);
        self.next += 1;
        self.blocks[i].clone()
    }
}

fn inc_eax_block() -> Block {
    let mut block = Block::new(
        vec![Stmt::assign(
            Exp::reg(32, "R_EAX"),
            Exp::binop(BinOp::Plus, Exp::reg(32, "R_EAX"), Exp::constant(32, 1)),
        )],
        1,
    );
    block.mnemonic = "inc".to_string();
    block.operands_text = "eax".to_string();
    block
}

fn translator(blocks: Vec<Result<Block, LiftError>>) -> Translator<X86, ScriptedLifter, Collector> {
    Translator::with_config(
        X86,
        ScriptedLifter::new(blocks),
        Collector::new(),
        TranslatorConfig::default(),
    )
}

#[test]
fn translate_reports_bytes_consumed() {
    let mut t = translator(vec![Ok(inc_eax_block())]);
    let consumed = t.translate(0x1000, &[0x40]).expect("translation failed");
    assert_eq!(consumed, 1);
    assert_eq!(t.sink().insts.len(), 1);
    assert_eq!(t.sink().insts[0].op, Opcode::Add);
}

#[test]
fn every_machine_instruction_emits_at_least_once() {
    // a block that lowers to nothing still produces a placeholder
    let empty = Block::new(vec![Stmt::Comment("nop".to_string())], 1);
    let mut t = translator(vec![Ok(empty)]);
    t.translate(0x1000, &[0x90]).expect("translation failed");

    let insts = &t.sink().insts;
    assert_eq!(insts.len(), 1);
    assert_eq!(insts[0].op, Opcode::None);
    assert!(insts[0].flags.contains(InstFlags::ASM_END));
}

#[test]
fn repeated_translation_is_byte_identical() {
    let mut t = translator(vec![Ok(inc_eax_block())]);
    t.translate(0x1000, &[0x40]).expect("translation failed");
    t.translate(0x1000, &[0x40]).expect("translation failed");

    let insts = &t.sink().insts;
    assert_eq!(insts.len(), 2);
    assert_eq!(insts[0], insts[1]);
}

#[test]
fn per_instruction_state_does_not_leak_across_calls() {
    // both calls allocate scratch slots; numbering restarts each time
    let block = Block::new(
        vec![Stmt::assign(Exp::temp(32, "T_x"), Exp::constant(32, 7))],
        1,
    );
    let mut t = translator(vec![Ok(block)]);
    t.translate(0x1000, &[0x90]).expect("translation failed");
    t.translate(0x1001, &[0x90]).expect("translation failed");

    let insts = &t.sink().insts;
    assert_eq!(insts[0].c.name(), Some("V_00"));
    assert_eq!(insts[1].c.name(), Some("V_00"));
    assert_eq!(insts[0].inum, 0);
    assert_eq!(insts[1].inum, 0);
}

#[test]
fn closure_sinks_observe_the_emission_order() {
    let mut seen = Vec::new();
    let mut t = Translator::with_config(
        X86,
        ScriptedLifter::new(vec![Ok(inc_eax_block())]),
        FnSink(|inst: &Instruction| seen.push((inst.inum, inst.op))),
        TranslatorConfig::default(),
    );
    t.translate(0x1000, &[0x40]).expect("translation failed");
    drop(t);

    assert_eq!(seen, vec![(0, Opcode::Add)]);
}

#[test]
fn lifter_errors_become_lifter_failures() {
    let mut t = translator(vec![Err(LiftError("decode error".to_string()))]);
    let err = t.translate(0x1000, &[0xff]).expect_err("must fail");
    assert!(matches!(err, TranslateError::LifterFailure(_)));
}

#[test]
fn zero_length_blocks_are_rejected() {
    let block = Block::new(vec![], 0);
    let mut t = translator(vec![Ok(block)]);
    let err = t.translate(0x1000, &[0x90]).expect_err("must fail");
    assert!(matches!(err, TranslateError::LifterFailure(_)));
}

#[test]
fn raw_metadata_carries_the_disassembly() {
    let mut t = translator(vec![Ok(inc_eax_block())]);
    t.translate(0x1000, &[0x40, 0x41]).expect("translation failed");

    let inst = &t.sink().insts[0];
    assert_eq!(inst.raw.addr, 0x1000);
    assert_eq!(inst.raw.size, 1);
    assert_eq!(inst.raw.mnemonic, "inc");
    assert_eq!(inst.raw.operands_text, "eax");
    // only the bytes of this instruction
    assert_eq!(inst.raw.bytes, vec![0x40]);
}
