use crate::error::{CoverageError, CoverageResult};
use crate::types::{BackendRegistry, TargetRecord};

/// Drops the build path prefix from a target. Targets without it are returned as-is.
pub fn strip_suite_prefix<'a>(target: &'a str, prefix: &str) -> &'a str {
    target.strip_prefix(prefix).unwrap_or(target)
}

impl TargetRecord {
    /// Splits `<name>__<reference>__<backend>` into name and backend.
    ///
    /// The marker must occur exactly once and the backend must be registered.
    pub fn parse(
        target: &str,
        reference_backend: &str,
        registry: &BackendRegistry,
    ) -> CoverageResult<Self> {
        let marker = format!("__{reference_backend}__");
        let mut parts = target.split(marker.as_str());
        let (name, backend) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(backend), None) => (name, backend),
            _ => {
                return Err(CoverageError::MalformedTarget {
                    target: target.to_string(),
                    marker,
                });
            }
        };
        if !registry.contains(backend) {
            return Err(CoverageError::UnknownBackend {
                target: target.to_string(),
                backend: backend.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            backend: backend.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BackendRegistry {
        [
            ("tf", "tensorflow"),
            ("tflite", "tflite"),
            ("iree_vmla", "vmla"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn parses_name_and_backend() {
        let rec = TargetRecord::parse("batch_norm__tf__iree_vmla", "tf", &registry()).unwrap();
        assert_eq!(rec.name, "batch_norm");
        assert_eq!(rec.backend, "iree_vmla");
    }

    #[test]
    fn reference_backend_compares_against_itself() {
        let rec = TargetRecord::parse("conv2d__tf__tf", "tf", &registry()).unwrap();
        assert_eq!(rec.name, "conv2d");
        assert_eq!(rec.backend, "tf");
    }

    #[test]
    fn single_underscores_stay_in_the_name() {
        let rec =
            TargetRecord::parse("mobilenet_v2_1.0_224__tf__tflite", "tf", &registry()).unwrap();
        assert_eq!(rec.name, "mobilenet_v2_1.0_224");
    }

    #[test]
    fn missing_marker_is_malformed() {
        let err = TargetRecord::parse("batch_norm_iree_vmla", "tf", &registry()).unwrap_err();
        assert!(matches!(err, CoverageError::MalformedTarget { .. }));
        assert!(err.to_string().contains("__tf__"));
    }

    #[test]
    fn repeated_marker_is_malformed() {
        let err = TargetRecord::parse("a__tf__b__tf__tflite", "tf", &registry()).unwrap_err();
        assert!(matches!(err, CoverageError::MalformedTarget { .. }));
    }

    #[test]
    fn unregistered_backend_is_rejected() {
        let err = TargetRecord::parse("add__tf__iree_metal", "tf", &registry()).unwrap_err();
        match err {
            CoverageError::UnknownBackend { backend, .. } => assert_eq!(backend, "iree_metal"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prefix_is_only_stripped_at_the_start() {
        let prefix = "//e2e:e2e_tests_";
        assert_eq!(
            strip_suite_prefix("//e2e:e2e_tests_add__tf__tflite", prefix),
            "add__tf__tflite"
        );
        assert_eq!(strip_suite_prefix("add__tf__tflite", prefix), "add__tf__tflite");
    }
}
