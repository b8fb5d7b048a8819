//! Catalog of integration providers exposed by the route groups

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A third-party integration and the methods it can execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub provider: String,
    pub description: String,
    pub methods: Vec<IntegrationMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationMethod {
    pub method: String,
    pub description: String,
}

impl Integration {
    pub fn new(provider: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            description: description.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>, description: impl Into<String>) -> Self {
        self.methods.push(IntegrationMethod {
            method: method.into(),
            description: description.into(),
        });
        self
    }

    pub fn method(&self, name: &str) -> Option<&IntegrationMethod> {
        self.methods.iter().find(|m| m.method == name)
    }

    /// The method to use when a caller does not name one.
    ///
    /// Only defined for single-method integrations.
    pub fn default_method(&self) -> Option<&IntegrationMethod> {
        match self.methods.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Immutable provider registry, ordered by provider name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    integrations: BTreeMap<String, Integration>,
}

impl Catalog {
    pub fn new(integrations: impl IntoIterator<Item = Integration>) -> Self {
        Self {
            integrations: integrations
                .into_iter()
                .map(|integration| (integration.provider.clone(), integration))
                .collect(),
        }
    }

    /// Providers shipped with the service
    pub fn builtin() -> Self {
        Self::new([
            Integration::new("brave", "Brave web search").with_method("search", "Search the web"),
            Integration::new("browserbase", "Headless browser sessions")
                .with_method("create_session", "Open a browser session")
                .with_method("get_session", "Fetch session details")
                .with_method("load_url", "Load a URL in a session"),
            Integration::new("email", "Outbound email over SMTP").with_method("send", "Send a message"),
            Integration::new("spider", "Website crawler").with_method("crawl", "Crawl a URL"),
            Integration::new("weather", "Current weather lookups")
                .with_method("get", "Weather for a location"),
            Integration::new("wikipedia", "Wikipedia article search")
                .with_method("search", "Search articles"),
        ])
    }

    /// Drop the named providers; unknown names are ignored
    pub fn without(mut self, disabled: &[String]) -> Self {
        for provider in disabled {
            if self.integrations.remove(provider.trim()).is_some() {
                tracing::info!(provider = %provider.trim(), "Integration disabled");
            }
        }
        self
    }

    pub fn get(&self, provider: &str) -> Option<&Integration> {
        self.integrations.get(provider)
    }

    pub fn list(&self) -> Vec<&Integration> {
        self.integrations.values().collect()
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }
}
