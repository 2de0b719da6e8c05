// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashSet;

use crate::core::error::{GlobalFnError, Result};

use super::{Computation, Signature};

/// Metadata key under which a passed signature check is cached.
pub const SIGNATURE_METADATA_KEY: &str = "__globalfn_function_signature__";

/// Validates a computation's declared signature before it is bound.
pub trait SignatureChecker: Send + Sync {
    fn check(&self, function: &str, signature: &Signature) -> Result<()>;

    /// Check `computation` unless a previous check is cached on it.
    fn check_cached(&self, computation: &Computation) -> Result<()> {
        if computation.metadata_value(SIGNATURE_METADATA_KEY).is_some() {
            return Ok(());
        }
        self.check(computation.name(), computation.signature())?;
        let cached = serde_json::to_value(computation.signature())
            .map_err(|e| anyhow::anyhow!("failed to record signature: {e}"))?;
        computation.set_metadata(SIGNATURE_METADATA_KEY, cached);
        Ok(())
    }
}

/// Requires unique, non-empty parameter names and an annotation on every
/// parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatedSignatureChecker;

impl SignatureChecker for AnnotatedSignatureChecker {
    fn check(&self, function: &str, signature: &Signature) -> Result<()> {
        let invalid = |reason: String| GlobalFnError::InvalidSignature {
            function: function.to_string(),
            reason,
        };

        let mut seen = HashSet::new();
        for (index, parameter) in signature.parameters.iter().enumerate() {
            if parameter.name.is_empty() {
                return Err(invalid(format!("parameter {index} has no name")));
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(invalid(format!(
                    "parameter '{}' is declared twice",
                    parameter.name
                )));
            }
            match parameter.annotation.as_deref() {
                Some(annotation) if !annotation.trim().is_empty() => {}
                _ => {
                    return Err(invalid(format!(
                        "parameter '{}' has no type annotation",
                        parameter.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::Parameter;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChecker(AtomicUsize);

    impl SignatureChecker for CountingChecker {
        fn check(&self, _function: &str, _signature: &Signature) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_annotated_signature_passes() {
        let signature = Signature::new()
            .with_parameter(Parameter::annotated("images", "Blob"))
            .with_parameter(Parameter::annotated("labels", "Blob"));
        assert!(AnnotatedSignatureChecker.check("train", &signature).is_ok());
    }

    #[test]
    fn test_missing_annotation_fails() {
        let signature = Signature::new().with_parameter(Parameter::new("x"));
        let err = AnnotatedSignatureChecker.check("f", &signature).unwrap_err();
        assert!(err.to_string().contains("'x' has no type annotation"));
    }

    #[test]
    fn test_duplicate_parameter_fails() {
        let signature = Signature::new()
            .with_parameter(Parameter::annotated("x", "Blob"))
            .with_parameter(Parameter::annotated("x", "Blob"));
        assert!(AnnotatedSignatureChecker.check("f", &signature).is_err());
    }

    #[test]
    fn test_check_result_is_cached() {
        let checker = CountingChecker(AtomicUsize::new(0));
        let computation = Computation::new("f", Signature::new(), |_| Ok(json!(null)));

        checker.check_cached(&computation).unwrap();
        checker.check_cached(&computation).unwrap();

        assert_eq!(checker.0.load(Ordering::SeqCst), 1);
        assert!(computation.metadata_value(SIGNATURE_METADATA_KEY).is_some());
    }
}
