// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Per-machine-instruction driver over a lifter collaborator.

use thiserror::Error;

use reil_bil::Block;
use reil_ir::RawInfo;

use crate::arch::Arch;
use crate::config::TranslatorConfig;
use crate::error::{Result, TranslateError};
use crate::lower::BlockTranslator;
use crate::sink::Sink;

/// Lifter failure reported by the collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct LiftError(pub String);

/// Produces a lifted block for the machine instruction at `addr`.
///
/// A returned block must carry a positive `inst_size`; the translator
/// rejects anything else.
pub trait Lifter {
    fn lift(&mut self, addr: u64, bytes: &[u8]) -> std::result::Result<Block, LiftError>;
}

/// Translates machine code one instruction at a time: lift, lower, emit.
///
/// Holds no state across machine instructions beyond its collaborators;
/// translating the same bytes twice emits identical streams.
pub struct Translator<A, L, S> {
    arch: A,
    lifter: L,
    sink: S,
    config: TranslatorConfig,
}

impl<A: Arch, L: Lifter, S: Sink> Translator<A, L, S> {
    pub fn new(arch: A, lifter: L, sink: S) -> Translator<A, L, S> {
        Translator::with_config(arch, lifter, sink, TranslatorConfig::from_env())
    }

    pub fn with_config(
        arch: A,
        lifter: L,
        sink: S,
        config: TranslatorConfig,
    ) -> Translator<A, L, S> {
        Translator { arch, lifter, sink, config }
    }

    /// Lower the machine instruction at `addr`. Returns the number of
    /// bytes it occupies, as reported by the lifter.
    pub fn translate(&mut self, addr: u64, bytes: &[u8]) -> Result<usize> {
        let block = self
            .lifter
            .lift(addr, bytes)
            .map_err(|e| TranslateError::LifterFailure(e.to_string()))?;
        if block.inst_size == 0 {
            return Err(TranslateError::LifterFailure(format!(
                "no instruction length at {addr:#x}"
            )));
        }

        let size = block.inst_size;
        let raw = RawInfo {
            addr,
            size: size as u8,
            mnemonic: block.mnemonic.clone(),
            operands_text: block.operands_text.clone(),
            bytes: bytes.get(..size).unwrap_or(bytes).to_vec(),
        };

        BlockTranslator::new(&self.arch, self.config, &mut self.sink, raw, &block).run()?;
        Ok(size)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
