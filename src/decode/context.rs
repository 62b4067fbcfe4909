//! The decode context.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::schema::Define;
use super::path::PathPattern;


//------------ DecodeContext -------------------------------------------------

/// Per-call configuration of decoding.
///
/// By default, decoding is strict DER: all deviations permitted by BER are
/// rejected. The various flags relax this. The [`bered`][Self::bered] flag
/// accepts all of them while the others only accept one specific
/// deviation each. Values decoded from BER deviations are marked as such
/// and report it via [`Value::bered`][crate::Value::bered].
///
/// In addition, the context carries defined-by rules that are applied to
/// the decoded tree in addition to those declared in the schema.
#[derive(Clone, Debug, Default)]
pub struct DecodeContext {
    /// Accept BER encoded data.
    ///
    /// This allows indefinite length, the constructed form of string
    /// types, non-canonical BOOLEAN values, and everything the other flags
    /// allow.
    pub bered: bool,

    /// Accept explicitly encoded values equal to their field’s DEFAULT.
    pub allow_default_values: bool,

    /// Accept SET and SET OF values not in canonical order.
    pub allow_unordered_set: bool,

    /// Accept explicitly tagged values whose content is longer than the
    /// value it wraps.
    pub allow_expl_oob: bool,

    /// Defined-by rules applied after the tree is decoded.
    pub defines_by_path: Vec<DefinesByPath>,
}

impl DecodeContext {
    /// Creates a context for strict DER decoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context accepting BER.
    pub fn ber() -> Self {
        DecodeContext { bered: true, .. Self::default() }
    }

    /// Adds a defined-by rule.
    pub fn with_defines_by_path(mut self, rule: DefinesByPath) -> Self {
        self.defines_by_path.push(rule);
        self
    }

    /// Returns whether explicitly encoded DEFAULT values are acceptable.
    pub fn default_values_allowed(&self) -> bool {
        self.bered || self.allow_default_values
    }

    /// Returns whether unordered SET and SET OF values are acceptable.
    pub fn unordered_set_allowed(&self) -> bool {
        self.bered || self.allow_unordered_set
    }
}


//------------ DefinesByPath -------------------------------------------------

/// A defined-by rule supplied when decoding.
///
/// Every decoded value whose path from the decode root matches `source`
/// acts as if its schema declared `defines`.
#[derive(Clone, Debug)]
pub struct DefinesByPath {
    /// The pattern for the path of the source values.
    pub source: PathPattern,

    /// The rules to apply for each source value.
    pub defines: Vec<Define>,
}

impl DefinesByPath {
    /// Creates a new rule.
    pub fn new(source: impl Into<PathPattern>, defines: Vec<Define>) -> Self {
        DefinesByPath { source: source.into(), defines }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags() {
        let ctx = DecodeContext::new();
        assert!(!ctx.default_values_allowed());
        assert!(!ctx.unordered_set_allowed());
        let ctx = DecodeContext::ber();
        assert!(ctx.default_values_allowed());
        assert!(ctx.unordered_set_allowed());
        let ctx = DecodeContext {
            allow_unordered_set: true, .. Default::default()
        };
        assert!(!ctx.default_values_allowed());
        assert!(ctx.unordered_set_allowed());
    }
}
