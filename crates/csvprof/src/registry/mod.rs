//! Test registry: identifier to predicate.
//!
//! Registration is idempotent. The first predicate registered under an
//! identifier is returned for every later request, so a regex named twice
//! is compiled once.

pub mod builtin;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{UserItem, UserItems};
use crate::error::{ProfilerError, Result};
use crate::external::ExternalFiles;
use crate::predicate::{LookupProviders, LookupTest, Predicate, RangeTest, RegexTest};

/// Test family selected by an identifier's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Bare keyword looked up in the registry.
    Named,
    Regex,
    Lookup,
    Range,
    Xcheck,
}

/// A parsed test identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestSpec {
    pub identifier: String,
    pub kind: TestKind,
}

impl TestSpec {
    /// Classify an identifier. A blank identifier means `anything`.
    ///
    /// Range literals are validated here so a malformed one fails while the
    /// configuration is read.
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(Self::named("anything"));
        }
        if matches!(identifier, "lookup" | "regex" | "xcheck" | "range") {
            return Err(ProfilerError::Config(format!(
                "lookup_, xcheck_, regex_ or range() defined improperly: {identifier}"
            )));
        }

        let kind = if identifier.starts_with("range") {
            RangeTest::parse(identifier)?;
            TestKind::Range
        } else if let Some(prefix) = ["lookup_", "regex_", "xcheck_"]
            .into_iter()
            .find(|prefix| identifier.starts_with(prefix))
        {
            if identifier.len() == prefix.len() {
                return Err(ProfilerError::Config(format!(
                    "{prefix} name must have a suffix: {identifier}"
                )));
            }
            match prefix {
                "lookup_" => TestKind::Lookup,
                "regex_" => TestKind::Regex,
                _ => TestKind::Xcheck,
            }
        } else {
            TestKind::Named
        };

        Ok(Self {
            identifier: identifier.to_string(),
            kind,
        })
    }

    pub fn named(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: TestKind::Named,
        }
    }
}

impl fmt::Display for TestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// Where non-inline test definitions come from.
#[derive(Debug, Clone, Copy)]
pub struct TestSources<'a> {
    pub user: &'a UserItems,
    pub providers: &'a LookupProviders,
    pub files: &'a ExternalFiles,
}

/// Registered tests for one run.
#[derive(Debug, Clone)]
pub struct TestRegistry {
    tests: IndexMap<String, Arc<Predicate>>,
}

impl TestRegistry {
    /// A registry holding every built-in test.
    pub fn new() -> Self {
        let tests = builtin::BUILTINS
            .iter()
            .map(|(name, predicate)| (name.to_string(), Arc::clone(predicate)))
            .collect();
        Self { tests }
    }

    /// A registry with no tests at all.
    pub fn empty() -> Self {
        Self {
            tests: IndexMap::new(),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<Predicate>> {
        self.tests.get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.tests.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Registered tests in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Predicate>)> {
        self.tests.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Register `predicate` unless `identifier` is taken; returns the
    /// predicate now registered under it.
    pub fn register(&mut self, identifier: &str, predicate: Predicate) -> Arc<Predicate> {
        if let Some(existing) = self.tests.get(identifier) {
            return Arc::clone(existing);
        }
        tracing::debug!(test = identifier, kind = predicate.kind(), "test registered");
        let predicate = Arc::new(predicate);
        self.tests.insert(identifier.to_string(), Arc::clone(&predicate));
        predicate
    }

    /// Register a regex test compiled from `pattern`.
    pub fn add_regex(&mut self, name: &str, pattern: &str) -> Result<Arc<Predicate>> {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }
        let regex = RegexTest::compile(name, pattern)?;
        Ok(self.register(name, Predicate::Regex(regex)))
    }

    /// Register a range test under its literal.
    pub fn add_range(&mut self, literal: &str) -> Result<Arc<Predicate>> {
        if let Some(existing) = self.get(literal) {
            return Ok(existing);
        }
        let range = RangeTest::parse(literal)?;
        Ok(self.register(literal, Predicate::Range(range)))
    }

    /// Register a lookup test over an explicit value list.
    pub fn add_lookup(&mut self, name: &str, values: Vec<String>) -> Arc<Predicate> {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        self.register(name, Predicate::Lookup(LookupTest::from_values(name, values)))
    }

    /// Resolve a non-xcheck identifier with no column user data.
    pub fn resolve(&mut self, identifier: &str, sources: &TestSources<'_>) -> Result<Arc<Predicate>> {
        let spec = TestSpec::parse(identifier)?;
        self.resolve_spec(&spec, &[], sources)
    }

    /// Resolve a column's test. `user_data` holds the column's user data
    /// rows (lookup values or regex text).
    pub fn resolve_spec(
        &mut self,
        spec: &TestSpec,
        user_data: &[String],
        sources: &TestSources<'_>,
    ) -> Result<Arc<Predicate>> {
        let name = spec.identifier.as_str();
        match spec.kind {
            TestKind::Named => self.get(name).ok_or_else(|| ProfilerError::UnknownTest {
                column: 0,
                name: name.to_string(),
            }),
            TestKind::Range => self.add_range(name),
            TestKind::Regex => {
                let source = user_data.first().map(String::as_str).unwrap_or_default();
                self.resolve_regex(name, source, sources)
            }
            TestKind::Lookup => self.resolve_lookup(name, user_data, sources),
            TestKind::Xcheck => Err(ProfilerError::Config(format!(
                "{name} is a cross-check group, not a single test"
            ))),
        }
    }

    /// Resolve one entry of an xcheck test list.
    ///
    /// `range(...)` and `lookup_*` entries build those tests; any other
    /// text names a registered test or is compiled as a regex named by its
    /// own text.
    pub fn resolve_xcheck_item(&mut self, item: &str, sources: &TestSources<'_>) -> Result<Arc<Predicate>> {
        if item.starts_with("range(") {
            self.add_range(item)
        } else if item.starts_with("lookup_") {
            if item.len() == "lookup_".len() {
                return Err(ProfilerError::Config(format!(
                    "lookup_ name must have a suffix: {item}"
                )));
            }
            self.resolve_lookup(item, &[], sources)
        } else {
            self.resolve_regex(item, item, sources)
        }
    }

    /// A regex test's pattern is, in order: `source` when it is a literal,
    /// the file named by `source` when it is a `regex_*` identifier, an
    /// inline pattern from the run configuration, or the test's own file.
    fn resolve_regex(&mut self, name: &str, source: &str, sources: &TestSources<'_>) -> Result<Arc<Predicate>> {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }
        let pattern = if source.starts_with("regex_") {
            sources.files.pattern(source)?
        } else if !source.is_empty() {
            source.to_string()
        } else {
            match sources.user.get(name) {
                Some(UserItem::Pattern(pattern)) if pattern.starts_with("regex_") => {
                    sources.files.pattern(pattern)?
                }
                Some(UserItem::Pattern(pattern)) => pattern.clone(),
                _ => sources.files.pattern(name)?,
            }
        };
        self.add_regex(name, &pattern)
    }

    /// Lookup resolution order: registered provider, import directive,
    /// column user data, inline configuration list, external file.
    fn resolve_lookup(
        &mut self,
        name: &str,
        user_data: &[String],
        sources: &TestSources<'_>,
    ) -> Result<Arc<Predicate>> {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }

        if let Some(provider) = sources.providers.for_test(name) {
            let test = LookupTest::from_provider(name, name, provider)?;
            return Ok(self.register(name, Predicate::Lookup(test)));
        }

        let configured = sources.user.get(name);
        if let Some(UserItem::Import { module, function }) = configured {
            let provider = sources.providers.for_import(module, function).ok_or_else(|| {
                ProfilerError::Provider {
                    name: format!("{module}.{function}"),
                    message: format!("no provider registered for {name}"),
                }
            })?;
            let test = LookupTest::from_provider(name, format!("{module}.{function}"), provider)?;
            return Ok(self.register(name, Predicate::Lookup(test)));
        }

        let values = match (user_data.first(), configured) {
            (Some(first), _) if first.starts_with("lookup_") => sources.files.lines(first)?,
            (Some(_), _) => user_data.to_vec(),
            (None, Some(UserItem::List(values))) => values.clone(),
            (None, _) => sources.files.lines(name)?,
        };
        Ok(self.add_lookup(name, values))
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
