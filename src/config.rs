use crate::error::{CoverageError, CoverageResult};
use crate::types::{BackendRegistry, TestSuite};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

/// Table layout compiled into the binary.
pub const BUILTIN_CONFIG: &str = include_str!("../config/coverage.yaml");

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct RawConfig {
    pub reference_backend: String,
    pub backends: IndexMap<String, String>,
    pub suites: IndexMap<String, String>,
    #[serde(default)]
    pub single_source_suites: IndexMap<String, String>,
    #[serde(default)]
    pub exclusion_filters: Vec<String>,
    pub success_element: String,
    pub failure_element: String,
    pub main_url: String,
    pub targets_url: String,
    pub description: String,
}

/// Test names hidden from the rendered tables.
///
/// Patterns match from the start of the name but need not consume all of it.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilters {
    patterns: Vec<Regex>,
}

impl ExclusionFilters {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> CoverageResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(&format!("^(?:{p})")).map_err(|e| {
                    CoverageError::Config(format!("invalid exclusion filter '{p}': {e}"))
                })
            })
            .collect::<CoverageResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CoverageConfig {
    pub reference_backend: String,
    pub registry: BackendRegistry,
    /// In report order
    pub suites: Vec<TestSuite>,
    pub exclusions: ExclusionFilters,
    pub success_element: String,
    pub failure_element: String,
    pub main_url: String,
    /// Preamble with links already filled in
    pub description: String,
}

impl CoverageConfig {
    pub fn builtin() -> CoverageResult<Self> {
        Self::from_yaml(BUILTIN_CONFIG)
    }

    pub fn from_yaml(content: &str) -> CoverageResult<Self> {
        let raw: RawConfig = serde_yaml::from_str(content)
            .map_err(|e| CoverageError::Config(format!("invalid coverage config: {e}")))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> CoverageResult<Self> {
        if raw.backends.is_empty() {
            return Err(CoverageError::Config("no backends configured".to_string()));
        }
        if !raw.backends.contains_key(&raw.reference_backend) {
            return Err(CoverageError::Config(format!(
                "reference backend '{}' is not a registered backend",
                raw.reference_backend
            )));
        }
        if let Some(orphan) = raw
            .single_source_suites
            .keys()
            .find(|target| !raw.suites.contains_key(*target))
        {
            return Err(CoverageError::Config(format!(
                "single-source override for unknown suite '{orphan}'"
            )));
        }

        let suites = raw
            .suites
            .iter()
            .map(|(target, header)| TestSuite {
                target: target.clone(),
                header: header.clone(),
                single_source: raw.single_source_suites.get(target).cloned(),
            })
            .collect();

        Ok(Self {
            exclusions: ExclusionFilters::new(&raw.exclusion_filters[..])?,
            registry: BackendRegistry::new(raw.backends),
            reference_backend: raw.reference_backend,
            suites,
            success_element: raw.success_element,
            failure_element: raw.failure_element,
            main_url: raw.main_url,
            description: raw.description.replace("{$targets_url}", &raw.targets_url),
        })
    }
}
