// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Operator and cast synthesis - sequences of present opcodes that
//! reproduce the bit-exact semantics of operators the target lacks.
//!
//! Each sequence shares the block's raw metadata and consecutive `inum`
//! values; the caller's destination and flags go on the final instruction.

use reil_bil::CastKind;
use reil_ir::{InstFlags, Opcode, Operand, Width};

use crate::error::{Result, TranslateError};
use crate::lower::expr::width_of;
use crate::lower::BlockTranslator;

impl BlockTranslator<'_> {
    /// Lower a width cast of the already-lowered `a` into `c`.
    pub(crate) fn lower_cast(
        &mut self,
        kind: CastKind,
        a: Operand,
        c: Operand,
        flags: InstFlags,
    ) -> Result<()> {
        let dst_w = width_of(&c);
        match kind {
            // Masking alone narrows; the source need not be truncated
            // first.
            CastKind::Low => {
                self.emit(
                    Opcode::And,
                    a,
                    Operand::constant(dst_w, dst_w.mask()),
                    c,
                    flags,
                );
                Ok(())
            }
            // Or-with-zero at the destination width zero-extends through
            // the three-address form.
            CastKind::Unsigned => {
                self.emit(Opcode::Or, a, Operand::constant(dst_w, 0), c, flags);
                Ok(())
            }
            CastKind::High => {
                let src_w = width_of(&a);
                let shift = src_w
                    .high_shift()
                    .ok_or(TranslateError::InvalidOperandSize(src_w.bits()))?;
                let t = self.synth_temp(src_w);
                self.emit(
                    Opcode::Shr,
                    a,
                    Operand::constant(src_w, u64::from(shift)),
                    t.clone(),
                    InstFlags::NONE,
                );
                self.emit(
                    Opcode::And,
                    t,
                    Operand::constant(dst_w, dst_w.mask()),
                    c,
                    flags,
                );
                Ok(())
            }
            CastKind::Signed => self.synth_signed_cast(a, c, flags),
        }
    }

    /// Sign extension. Builds an all-ones-or-zero value from the source
    /// sign bit, keeps its high part, and ors it over the source.
    fn synth_signed_cast(&mut self, a: Operand, c: Operand, flags: InstFlags) -> Result<()> {
        let src_w = width_of(&a);
        let dst_w = width_of(&c);
        if dst_w <= src_w {
            return Err(TranslateError::InvalidSignedCast { src: src_w, dst: dst_w });
        }

        let t0 = self.synth_temp(src_w);
        self.emit(
            Opcode::And,
            a.clone(),
            Operand::constant(src_w, src_w.sign_mask()),
            t0.clone(),
            InstFlags::NONE,
        );

        let t1 = self.synth_temp(Width::W1);
        self.emit(
            Opcode::Eq,
            t0,
            Operand::constant(src_w, 0),
            t1.clone(),
            InstFlags::NONE,
        );

        let t2 = self.synth_temp(dst_w);
        self.emit(
            Opcode::Or,
            t1,
            Operand::constant(dst_w, 0),
            t2.clone(),
            InstFlags::NONE,
        );

        // 0 for a positive source, all ones for a negative one
        let t3 = self.synth_temp(dst_w);
        self.emit(
            Opcode::Sub,
            t2,
            Operand::constant(dst_w, 1),
            t3.clone(),
            InstFlags::NONE,
        );

        let t4 = self.synth_temp(dst_w);
        self.emit(
            Opcode::And,
            t3,
            Operand::constant(dst_w, dst_w.mask() & !src_w.mask()),
            t4.clone(),
            InstFlags::NONE,
        );

        self.emit(Opcode::Or, a, t4, c, flags);
        Ok(())
    }

    /// `a != b` as `NOT (a == b)`.
    pub(crate) fn synth_neq(&mut self, a: Operand, b: Operand, c: Operand, flags: InstFlags) {
        let t = self.synth_temp(Width::W1);
        self.emit(Opcode::Eq, a, b, t.clone(), InstFlags::NONE);
        self.emit(Opcode::Not, t, Operand::None, c, flags);
    }

    /// `a <= b` as `(a == b) | (a < b)`.
    pub(crate) fn synth_le(&mut self, a: Operand, b: Operand, c: Operand, flags: InstFlags) {
        let t0 = self.synth_temp(Width::W1);
        self.emit(Opcode::Eq, a.clone(), b.clone(), t0.clone(), InstFlags::NONE);
        let t1 = self.synth_temp(Width::W1);
        self.emit(Opcode::Lt, a, b, t1.clone(), InstFlags::NONE);
        self.emit(Opcode::Or, t0, t1, c, flags);
    }

    /// Arithmetic right shift: a logical shift with the vacated high bits
    /// filled from the source sign.
    pub(crate) fn synth_arshift(
        &mut self,
        a: Operand,
        b: Operand,
        c: Operand,
        flags: InstFlags,
    ) {
        let src_w = width_of(&a);
        let dst_w = width_of(&c);

        // isolate the sign bit
        let t0 = self.synth_temp(src_w);
        self.emit(
            Opcode::And,
            a.clone(),
            Operand::constant(src_w, src_w.sign_mask()),
            t0.clone(),
            InstFlags::NONE,
        );

        let t1 = self.synth_temp(Width::W1);
        self.emit(
            Opcode::Eq,
            t0,
            Operand::constant(src_w, 0),
            t1.clone(),
            InstFlags::NONE,
        );

        let t2 = self.synth_temp(dst_w);
        self.emit(
            Opcode::Or,
            t1,
            Operand::constant(dst_w, 0),
            t2.clone(),
            InstFlags::NONE,
        );

        // 0 for a positive source, all ones for a negative one
        let t3 = self.synth_temp(dst_w);
        self.emit(
            Opcode::Sub,
            t2,
            Operand::constant(dst_w, 1),
            t3.clone(),
            InstFlags::NONE,
        );

        // complement of the shift distance
        let t4 = self.synth_temp(dst_w);
        self.emit(
            Opcode::Sub,
            Operand::constant(dst_w, u64::from(dst_w.bits())),
            at_width(&b, dst_w),
            t4.clone(),
            InstFlags::NONE,
        );

        // mask of the bits the shift vacates
        let t5 = self.synth_temp(dst_w);
        self.emit(Opcode::Shl, t3, t4, t5.clone(), InstFlags::NONE);

        let t6 = self.synth_temp(dst_w);
        self.emit(Opcode::Shr, a, b, t6.clone(), InstFlags::NONE);

        self.emit(Opcode::Or, t5, t6, c, flags);
    }
}

/// Re-issue a constant at the given width; named operands pass through.
fn at_width(op: &Operand, width: Width) -> Operand {
    match op {
        Operand::Const { value, .. } => Operand::constant(width, *value),
        other => other.clone(),
    }
}
