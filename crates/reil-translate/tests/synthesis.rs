// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Synthesized-operator equivalence tests.
//!
//! Every operator the target lacks is expanded into a sequence of present
//! opcodes; these tests execute the emitted sequences on the reference
//! machine and compare against plain integer arithmetic, exhaustively for
//! the narrow widths and with randomized sweeps for the wide ones.

use proptest::prelude::*;

use reil_bil::{BinOp, Block, CastKind, Exp, Stmt};
use reil_eval::{sign_extend, Machine};
use reil_ir::{Instruction, RawInfo, Width};
use reil_translate::{BlockTranslator, Collector, TranslatorConfig, X86};

const RESULT: &str = "V_RES";

fn lower_stmts(stmts: Vec<Stmt>) -> Vec<Instruction> {
    let block = Block::new(stmts, 4);
    let mut sink = Collector::new();
    let raw = RawInfo { addr: 0x4000, size: 4, ..RawInfo::default() };
    BlockTranslator::new(&X86, TranslatorConfig::default(), &mut sink, raw, &block)
        .run()
        .expect("lowering failed");
    sink.insts
}

fn eval(stmts: Vec<Stmt>) -> u64 {
    let insts = lower_stmts(stmts);
    let mut machine = Machine::new();
    machine.run(&insts).expect("evaluation failed");
    machine.get(RESULT)
}

fn arshift(bits: u32, src: u64, sh: u64) -> u64 {
    eval(vec![Stmt::assign(
        Exp::temp(bits, RESULT),
        Exp::binop(
            BinOp::ARShift,
            Exp::constant(bits, src),
            Exp::constant(8, sh),
        ),
    )])
}

fn arshift_ref(width: Width, src: u64, sh: u64) -> u64 {
    (sign_extend(src, width) >> sh) as u64 & width.mask()
}

fn compare(op: BinOp, bits: u32, a: u64, b: u64) -> u64 {
    eval(vec![Stmt::assign(
        Exp::temp(1, RESULT),
        Exp::binop(op, Exp::constant(bits, a), Exp::constant(bits, b)),
    )])
}

fn cast(kind: CastKind, src_bits: u32, dst_bits: u32, src: u64) -> u64 {
    eval(vec![Stmt::assign(
        Exp::temp(dst_bits, RESULT),
        Exp::cast(kind, dst_bits, Exp::constant(src_bits, src)),
    )])
}

fn signed_cast_ref(src_w: Width, dst_w: Width, src: u64) -> u64 {
    sign_extend(src, src_w) as u64 & dst_w.mask()
}

// ═══════════════════════════════════════════════════════════
// Exhaustive sweeps over the narrow widths
// ═══════════════════════════════════════════════════════════

#[test]
fn arshift_w1_exhaustive() {
    for src in 0..=1u64 {
        assert_eq!(arshift(1, src, 0), arshift_ref(Width::W1, src, 0));
    }
}

#[test]
fn arshift_w8_exhaustive() {
    for src in 0..=0xffu64 {
        for sh in 0..8u64 {
            assert_eq!(
                arshift(8, src, sh),
                arshift_ref(Width::W8, src, sh),
                "src={src:#x} sh={sh}"
            );
        }
    }
}

#[test]
fn neq_and_le_w1_exhaustive() {
    for a in 0..=1u64 {
        for b in 0..=1u64 {
            assert_eq!(compare(BinOp::Neq, 1, a, b), (a != b) as u64);
            assert_eq!(compare(BinOp::Le, 1, a, b), (a <= b) as u64);
        }
    }
}

#[test]
fn signed_cast_w8_to_w16_exhaustive() {
    for src in 0..=0xffu64 {
        assert_eq!(
            cast(CastKind::Signed, 8, 16, src),
            signed_cast_ref(Width::W8, Width::W16, src),
            "src={src:#x}"
        );
    }
}

#[test]
fn high_cast_w16_exhaustive() {
    for src in 0..=0xffffu64 {
        assert_eq!(cast(CastKind::High, 16, 8, src), src >> 8);
    }
}

// ═══════════════════════════════════════════════════════════
// Randomized sweeps over the wide widths
// ═══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arshift_w16_matches_the_integer_model(src in 0u64..=0xffff, sh in 0u64..16) {
        prop_assert_eq!(arshift(16, src, sh), arshift_ref(Width::W16, src, sh));
    }

    #[test]
    fn arshift_w32_matches_the_integer_model(src: u32, sh in 0u64..32) {
        let src = u64::from(src);
        prop_assert_eq!(arshift(32, src, sh), arshift_ref(Width::W32, src, sh));
    }

    #[test]
    fn arshift_w64_matches_the_integer_model(src: u64, sh in 0u64..64) {
        prop_assert_eq!(arshift(64, src, sh), arshift_ref(Width::W64, src, sh));
    }

    #[test]
    fn neq_matches_the_integer_model(a: u32, b: u32, force_equal: bool) {
        let (a, b) = if force_equal { (a, a) } else { (a, b) };
        prop_assert_eq!(
            compare(BinOp::Neq, 32, u64::from(a), u64::from(b)),
            (a != b) as u64
        );
    }

    #[test]
    fn le_matches_the_unsigned_model(a: u64, b: u64, force_equal: bool) {
        let (a, b) = if force_equal { (a, a) } else { (a, b) };
        prop_assert_eq!(compare(BinOp::Le, 64, a, b), (a <= b) as u64);
    }

    #[test]
    fn signed_cast_w16_to_w32(src in 0u64..=0xffff) {
        prop_assert_eq!(
            cast(CastKind::Signed, 16, 32, src),
            signed_cast_ref(Width::W16, Width::W32, src)
        );
    }

    #[test]
    fn signed_cast_w32_to_w64(src: u32) {
        let src = u64::from(src);
        prop_assert_eq!(
            cast(CastKind::Signed, 32, 64, src),
            signed_cast_ref(Width::W32, Width::W64, src)
        );
    }

    #[test]
    fn signed_cast_w8_to_w64(src in 0u64..=0xff) {
        prop_assert_eq!(
            cast(CastKind::Signed, 8, 64, src),
            signed_cast_ref(Width::W8, Width::W64, src)
        );
    }

    #[test]
    fn high_cast_keeps_the_upper_half(src: u64) {
        prop_assert_eq!(cast(CastKind::High, 64, 32, src), src >> 32);
        let src32 = src & Width::W32.mask();
        prop_assert_eq!(cast(CastKind::High, 32, 16, src32), src32 >> 16);
    }

    #[test]
    fn unsigned_cast_zero_extends(src in 0u64..=0xff) {
        prop_assert_eq!(cast(CastKind::Unsigned, 8, 32, src), src);
        prop_assert_eq!(cast(CastKind::Unsigned, 8, 64, src), src);
    }

    #[test]
    fn low_cast_truncates(src: u64) {
        prop_assert_eq!(cast(CastKind::Low, 64, 8, src), src & 0xff);
        prop_assert_eq!(cast(CastKind::Low, 64, 32, src), src & 0xffff_ffff);
    }
}
