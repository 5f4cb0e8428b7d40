//! Set-membership tests and the lookup provider capability.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{ProfilerError, Result};

/// An externally supplied membership function.
///
/// Providers are registered with [`LookupProviders`] before a run starts and
/// bound to a `lookup_*` test while the configuration is built.
pub trait LookupProvider: Send + Sync {
    /// Called once when the provider is bound to a test.
    fn init(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Whether `value` is a member.
    fn resolve(&self, value: &str) -> bool;
}

impl<F> LookupProvider for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn resolve(&self, value: &str) -> bool {
        self(value)
    }
}

/// Catalog of providers available to a run.
///
/// Providers are found either by test identifier (`lookup_states`) or by the
/// `(module, function)` pair named in an `import <module> <function>`
/// configuration directive.
#[derive(Clone, Default)]
pub struct LookupProviders {
    by_test: HashMap<String, Arc<dyn LookupProvider>>,
    by_import: HashMap<(String, String), Arc<dyn LookupProvider>>,
}

impl LookupProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for one lookup test identifier.
    pub fn register(&mut self, test: impl Into<String>, provider: impl LookupProvider + 'static) {
        self.by_test.insert(test.into(), Arc::new(provider));
    }

    /// Register a provider reachable through an import directive.
    pub fn register_import(
        &mut self,
        module: impl Into<String>,
        function: impl Into<String>,
        provider: impl LookupProvider + 'static,
    ) {
        self.by_import
            .insert((module.into(), function.into()), Arc::new(provider));
    }

    pub(crate) fn for_test(&self, test: &str) -> Option<Arc<dyn LookupProvider>> {
        self.by_test.get(test).cloned()
    }

    pub(crate) fn for_import(&self, module: &str, function: &str) -> Option<Arc<dyn LookupProvider>> {
        self.by_import
            .get(&(module.to_string(), function.to_string()))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.by_test.is_empty() && self.by_import.is_empty()
    }
}

impl fmt::Debug for LookupProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tests: Vec<&String> = self.by_test.keys().collect();
        tests.sort();
        let mut imports: Vec<String> = self
            .by_import
            .keys()
            .map(|(m, func)| format!("{m}.{func}"))
            .collect();
        imports.sort();
        f.debug_struct("LookupProviders")
            .field("tests", &tests)
            .field("imports", &imports)
            .finish()
    }
}

#[derive(Clone)]
enum Members {
    List {
        values: Vec<String>,
        index: HashSet<String>,
    },
    Provider {
        source: String,
        provider: Arc<dyn LookupProvider>,
    },
}

/// Exact, case-sensitive membership test.
#[derive(Clone)]
pub struct LookupTest {
    name: String,
    members: Members,
}

impl LookupTest {
    /// Build from an explicit value list. Order is kept for display.
    pub fn from_values(name: impl Into<String>, values: Vec<String>) -> Self {
        let index = values.iter().cloned().collect();
        Self {
            name: name.into(),
            members: Members::List { values, index },
        }
    }

    /// Bind a provider, running its init hook.
    ///
    /// `source` describes where the provider came from and is shown in
    /// verbose dumps.
    pub fn from_provider(
        name: impl Into<String>,
        source: impl Into<String>,
        provider: Arc<dyn LookupProvider>,
    ) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        provider.init().map_err(|message| ProfilerError::Provider {
            name: source.clone(),
            message,
        })?;
        tracing::debug!(test = %name, %source, "lookup provider bound");
        Ok(Self {
            name,
            members: Members::Provider { source, provider },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of listed values, `None` for provider-backed tests.
    pub fn len(&self) -> Option<usize> {
        match &self.members {
            Members::List { values, .. } => Some(values.len()),
            Members::Provider { .. } => None,
        }
    }

    pub fn test(&self, value: &str) -> bool {
        match &self.members {
            Members::List { index, .. } => index.contains(value),
            Members::Provider { provider, .. } => provider.resolve(value),
        }
    }
}

impl fmt::Debug for LookupTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LookupTest({self})")
    }
}

impl fmt::Display for LookupTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.members {
            Members::List { values, .. } if values.len() <= 3 => {
                write!(f, "{} {}", self.name, values.join(", "))
            }
            Members::List { values, .. } => {
                write!(f, "{} {}, {}, {},...", self.name, values[0], values[1], values[2])
            }
            Members::Provider { source, .. } => write!(f, "{} provider {source}", self.name),
        }
    }
}
