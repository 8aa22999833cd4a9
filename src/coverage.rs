use crate::config::CoverageConfig;
use crate::error::{CoverageError, CoverageResult};
use crate::query::BuildQuery;
use crate::target::strip_suite_prefix;
use crate::types::{BackendRegistry, TargetRecord, TestSuite};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Parsed query results for one suite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteMetadata {
    /// Every distinct test name from both lists, sorted
    pub names: Vec<String>,
    pub passing: Vec<TargetRecord>,
    /// Parsed for completeness; tables are built from `passing` only.
    pub failing: Vec<TargetRecord>,
}

impl SuiteMetadata {
    /// Queries the suite and its `_failing` companion and parses both listings.
    pub fn collect<Q: BuildQuery + ?Sized>(
        query: &Q,
        suite: &TestSuite,
        config: &CoverageConfig,
    ) -> CoverageResult<Self> {
        let passing = query.test_targets(&suite.target)?;
        let failing = query.test_targets(&suite.failing_target())?;
        debug!(
            "{}: {} passing, {} failing targets",
            suite.target,
            passing.len(),
            failing.len()
        );
        Self::from_targets(suite, &passing, &failing, config)
    }

    pub fn from_targets(
        suite: &TestSuite,
        passing: &[String],
        failing: &[String],
        config: &CoverageConfig,
    ) -> CoverageResult<Self> {
        let parse_all = |targets: &[String], prefix: &str| {
            targets
                .iter()
                .map(|t| {
                    TargetRecord::parse(
                        strip_suite_prefix(t, prefix),
                        &config.reference_backend,
                        &config.registry,
                    )
                })
                .collect::<CoverageResult<Vec<_>>>()
        };
        let passing = parse_all(passing, &suite.passing_prefix())?;
        let failing = parse_all(failing, &suite.failing_prefix())?;

        let names: BTreeSet<&str> = passing
            .iter()
            .chain(&failing)
            .map(|r| r.name.as_str())
            .collect();
        let names = names.into_iter().map(str::to_string).collect();

        Ok(Self {
            names,
            passing,
            failing,
        })
    }
}

/// Test name -> pass flag per backend, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    width: usize,
    entries: BTreeMap<String, Vec<bool>>,
}

impl Coverage {
    pub fn new(registry: &BackendRegistry) -> Self {
        Self {
            width: registry.len(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_passing(
        registry: &BackendRegistry,
        passing: &[TargetRecord],
    ) -> CoverageResult<Self> {
        let mut coverage = Self::new(registry);
        for record in passing {
            coverage.record_pass(registry, record)?;
        }
        Ok(coverage)
    }

    /// Vector for `name`, inserting an all-false one on first use.
    pub fn entry_or_default(&mut self, name: &str) -> &mut Vec<bool> {
        let width = self.width;
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| vec![false; width])
    }

    pub fn record_pass(
        &mut self,
        registry: &BackendRegistry,
        record: &TargetRecord,
    ) -> CoverageResult<()> {
        let idx = registry
            .index_of(&record.backend)
            .ok_or_else(|| CoverageError::UnknownBackend {
                target: record.name.clone(),
                backend: record.backend.clone(),
            })?;
        self.entry_or_default(&record.name)[idx] = true;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[bool]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Entries in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[bool])> {
        self.entries
            .iter()
            .map(|(name, flags)| (name.as_str(), flags.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}
