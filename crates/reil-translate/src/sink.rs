// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Emission sink.

use reil_ir::Instruction;

/// Receives every emitted target instruction, in emission order.
///
/// The sink borrows the instruction for the duration of the call; copy
/// anything that must outlive it.
pub trait Sink {
    fn emit(&mut self, inst: &Instruction);
}

/// Sink that retains every instruction.
#[derive(Debug, Default)]
pub struct Collector {
    pub insts: Vec<Instruction>,
}

impl Collector {
    pub fn new() -> Collector {
        Collector::default()
    }
}

impl Sink for Collector {
    fn emit(&mut self, inst: &Instruction) {
        self.insts.push(inst.clone());
    }
}

/// Adapter turning a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F: FnMut(&Instruction)> Sink for FnSink<F> {
    fn emit(&mut self, inst: &Instruction) {
        (self.0)(inst);
    }
}
