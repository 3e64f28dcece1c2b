// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostic configuration.

/// Diagnostic switches. Neither changes what is emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslatorConfig {
    /// Trace every lifted statement as it is lowered
    /// (`REIL_DEBUG_BIL` env var).
    pub trace_bil: bool,
    /// Trace temporary-slot allocation (`REIL_DEBUG_TEMPREG` env var).
    pub trace_tempreg: bool,
}

impl TranslatorConfig {
    /// Read the diagnostic switches from the environment.
    pub fn from_env() -> TranslatorConfig {
        TranslatorConfig {
            trace_bil: env_flag("REIL_DEBUG_BIL"),
            trace_tempreg: env_flag("REIL_DEBUG_TEMPREG"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(std::env::var(name), Ok(v) if !v.is_empty() && v != "0")
}
