use indexmap::IndexMap;

/// A generated test suite as it appears in the build graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    /// Build target path, e.g. `//integrations/tensorflow/e2e:e2e_tests`
    pub target: String,
    /// Section heading in the report
    pub header: String,
    /// Shared source file (without `.py`) when every case is generated from one file
    pub single_source: Option<String>,
}

impl TestSuite {
    pub fn new(target: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            header: header.into(),
            single_source: None,
        }
    }

    pub fn with_single_source(mut self, source: impl Into<String>) -> Self {
        self.single_source = Some(source.into());
        self
    }

    /// `//path/to/tests:suite` -> `path/to/tests`
    pub fn source_dir(&self) -> &str {
        let path = match self.target.split_once(':') {
            Some((path, _)) => path,
            None => &self.target,
        };
        path.strip_prefix("//").unwrap_or(path)
    }

    /// Companion suite holding the targets expected to fail.
    pub fn failing_target(&self) -> String {
        format!("{}_failing", self.target)
    }

    pub fn passing_prefix(&self) -> String {
        format!("{}_", self.target)
    }

    pub fn failing_prefix(&self) -> String {
        format!("{}_failing_", self.target)
    }
}

/// Ordered backend identifier -> display title. Defines the table's column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRegistry {
    backends: IndexMap<String, String>,
}

impl BackendRegistry {
    pub fn new(backends: IndexMap<String, String>) -> Self {
        Self { backends }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn contains(&self, backend: &str) -> bool {
        self.backends.contains_key(backend)
    }

    /// Column index of a backend
    pub fn index_of(&self, backend: &str) -> Option<usize> {
        self.backends.get_index_of(backend)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.backends.values().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BackendRegistry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A test target split into its logical name and the backend it ran on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetRecord {
    pub name: String,
    pub backend: String,
}
