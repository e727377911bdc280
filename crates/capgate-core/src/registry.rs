//! Name-based lookup of dispatchable adapters.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{AdapterHandle, Classifier, Generator};
use crate::capability::CapabilityName;

/// Binds each dispatchable capability to at most one adapter.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    adapters: HashMap<CapabilityName, AdapterHandle>,
}

impl CapabilityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolve a client-supplied capability name.
    ///
    /// Case-insensitive; blank names, unknown names and capabilities outside
    /// name-based dispatch resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<(CapabilityName, &AdapterHandle)> {
        let capability: CapabilityName = name.parse().ok()?;
        if !capability.is_dispatchable() {
            return None;
        }
        self.get(capability).map(|handle| (capability, handle))
    }

    pub fn get(&self, capability: CapabilityName) -> Option<&AdapterHandle> {
        self.adapters.get(&capability)
    }

    /// The bound classifier, if any.
    pub fn classifier(&self) -> Option<Arc<dyn Classifier>> {
        match self.get(CapabilityName::ImageClassifier)? {
            AdapterHandle::Classifier(c) => Some(c.clone()),
            AdapterHandle::Generator(_) => None,
        }
    }

    /// The generator bound to `capability`, if any.
    pub fn generator(&self, capability: CapabilityName) -> Option<Arc<dyn Generator>> {
        match self.get(capability)? {
            AdapterHandle::Generator(g) => Some(g.clone()),
            AdapterHandle::Classifier(_) => None,
        }
    }

    /// Bound capabilities in declaration order.
    pub fn capabilities(&self) -> Vec<CapabilityName> {
        CapabilityName::DISPATCHABLE
            .into_iter()
            .filter(|c| self.adapters.contains_key(c))
            .collect()
    }
}

/// Builder for [`CapabilityRegistry`]. Binding a capability twice keeps the
/// last adapter.
#[derive(Default)]
pub struct RegistryBuilder {
    adapters: HashMap<CapabilityName, AdapterHandle>,
}

impl RegistryBuilder {
    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.adapters.insert(
            CapabilityName::ImageClassifier,
            AdapterHandle::Classifier(classifier),
        );
        self
    }

    pub fn text_generation(mut self, generator: Arc<dyn Generator>) -> Self {
        self.adapters.insert(
            CapabilityName::TextGeneration,
            AdapterHandle::Generator(generator),
        );
        self
    }

    pub fn agent(mut self, generator: Arc<dyn Generator>) -> Self {
        self.adapters
            .insert(CapabilityName::Agent, AdapterHandle::Generator(generator));
        self
    }

    pub fn build(self) -> CapabilityRegistry {
        CapabilityRegistry {
            adapters: self.adapters,
        }
    }
}
