//! Domain catalog set: what each domain has accumulated and where it goes.

use std::path::PathBuf;

use crate::core::{
    data::{Catalog, Headers},
    error::ConfigError,
};

/// One named translation domain during a run.
#[derive(Debug, Clone)]
pub struct Domain {
    pub name: String,
    pub catalog: Catalog,
    /// Never empty once validated. The first one is the primary target.
    pub targets: Vec<PathBuf>,
}

impl Domain {
    pub fn primary(&self) -> Option<&PathBuf> {
        self.targets.first()
    }
}

/// Domains in declaration order.
#[derive(Debug, Clone, Default)]
pub struct DomainSet {
    domains: Vec<Domain>,
    default_domain: Option<String>,
}

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with `targets`. Declaring a known domain again appends
    /// the targets to its list.
    pub fn declare<I, P>(&mut self, name: &str, targets: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let targets = targets.into_iter().map(Into::into);
        match self.domains.iter_mut().find(|d| d.name == name) {
            Some(domain) => domain.targets.extend(targets),
            None => self.domains.push(Domain {
                name: name.to_string(),
                catalog: Catalog::for_domain(name),
                targets: targets.collect(),
            }),
        }
    }

    /// Set headers on every fresh catalog, keeping existing values for
    /// headers not listed.
    pub fn apply_headers(&mut self, headers: &Headers) {
        for domain in &mut self.domains {
            for (name, value) in headers.iter() {
                domain.catalog.headers_mut().set(name, value);
            }
        }
    }

    pub fn set_default_domain(&mut self, name: Option<&str>) {
        self.default_domain = name.map(str::to_string);
    }

    /// The explicit default domain, else the first declared one.
    pub fn default_domain(&self) -> Option<&str> {
        self.default_domain
            .as_deref()
            .or_else(|| self.domains.first().map(|d| d.name.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Domain> {
        self.domains.iter()
    }

    /// Union scanned entries into a declared domain.
    ///
    /// Returns the catalog back if `name` was never declared.
    pub fn absorb(&mut self, name: &str, scanned: Catalog) -> Result<(), Catalog> {
        match self.domains.iter_mut().find(|d| d.name == name) {
            Some(domain) => {
                domain.catalog.extend(scanned.into_entries());
                Ok(())
            }
            None => Err(scanned),
        }
    }

    /// Configuration errors, checked before any I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domains.is_empty() {
            return Err(ConfigError::NoDomains);
        }
        for domain in &self.domains {
            if domain.name.is_empty() {
                return Err(ConfigError::EmptyDomainName);
            }
            if domain.targets.is_empty() {
                return Err(ConfigError::NoTargets(domain.name.clone()));
            }
        }
        Ok(())
    }

    pub fn into_domains(self) -> Vec<Domain> {
        self.domains
    }
}
