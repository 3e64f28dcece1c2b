// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Translation error types.

use reil_bil::BinOp;
use reil_ir::Width;
use thiserror::Error;

/// A lowering error. All variants abort the current machine instruction;
/// instructions already handed to the sink stand.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("unsupported expression: {0}")]
    InvalidExpression(String),

    #[error("invalid operand size: {0} bits")]
    InvalidOperandSize(u32),

    #[error("operator {0:?} has no target lowering")]
    UnsupportedOperator(BinOp),

    #[error("signed cast must widen ({src} to {dst} bits)")]
    InvalidSignedCast { src: Width, dst: Width },

    #[error("unresolved label `{0}`")]
    UnresolvedLabel(String),

    #[error("conditional jump false target `{0}` is not the label of the next statement")]
    UnexpectedCJmpFalseTarget(String),

    #[error("label `{0}` in the middle of a machine instruction")]
    MidInstructionLabel(String),

    #[error("statement kind not implemented: {0}")]
    UnimplementedStatement(&'static str),

    #[error("lifter failure: {0}")]
    LifterFailure(String),
}

pub type Result<T> = std::result::Result<T, TranslateError>;
