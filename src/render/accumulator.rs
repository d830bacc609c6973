//! The set of asset bundles touched while materialising one tree.

use indexmap::IndexSet;

/// Bundle names in the order they were first touched, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleAccumulator {
    bundles: IndexSet<String>,
}

impl BundleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bundle; returns false if it was already recorded.
    pub fn insert(&mut self, bundle: &str) -> bool {
        if self.bundles.contains(bundle) {
            return false;
        }
        self.bundles.insert(bundle.to_string())
    }

    pub fn extend<'a, I>(&mut self, bundles: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for bundle in bundles {
            self.insert(bundle);
        }
    }

    pub fn contains(&self, bundle: &str) -> bool {
        self.bundles.contains(bundle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.bundles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
