// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Lowering translator: lifted tree IR in, linear REIL target IR out.
//!
//! The translator flattens nested typed expressions into three-address
//! instructions over the fixed REIL opcode set, synthesizing the operators
//! the target lacks (arithmetic right shift, not-equal, less-or-equal,
//! signed and high casts) out of the ones it has.
//!
//! [`BlockTranslator`] lowers one already-lifted machine instruction;
//! [`Translator`] drives a [`Lifter`] collaborator over raw bytes and
//! lowers each resulting block. Emitted instructions go to a [`Sink`] in
//! emission order.

mod arch;
mod config;
mod error;
mod lower;
mod sink;
mod tempreg;
mod translator;

pub use arch::{Arch, Arm, UnknownArgs, X64, X86};
pub use config::TranslatorConfig;
pub use error::{Result, TranslateError};
pub use lower::{BlockTranslator, UNKNOWN_INSN_TAG};
pub use sink::{Collector, FnSink, Sink};
pub use tempreg::TempAlloc;
pub use translator::{LiftError, Lifter, Translator};
