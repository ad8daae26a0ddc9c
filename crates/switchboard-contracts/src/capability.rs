//! Capability tags.
//!
//! Agents declare capabilities; intents require them. The dispatcher
//! selects an agent when the two sets intersect. Capabilities are plain
//! snake_case tags such as "system_analysis" or "html_generation".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An opaque capability tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(pub String);

impl Capability {
    /// Construct a capability from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// The set of capabilities an agent declares.
///
/// Ordered so that status output and serialized descriptors are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    inner: BTreeSet<Capability>,
}

impl CapabilitySet {
    /// Grant a capability to this set.
    pub fn grant(&mut self, capability: Capability) {
        self.inner.insert(capability);
    }

    /// Return true if the set contains the given capability.
    pub fn has(&self, capability: &Capability) -> bool {
        self.inner.contains(capability)
    }

    /// Return true if any of `required` is in this set.
    ///
    /// An empty `required` slice never intersects.
    pub fn intersects(&self, required: &[Capability]) -> bool {
        required.iter().any(|c| self.inner.contains(c))
    }

    /// Return an iterator over all granted capabilities.
    pub fn all(&self) -> impl Iterator<Item = &Capability> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().map(Capability::new).collect(),
        }
    }
}
