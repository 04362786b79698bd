pub mod json;

pub use json::JsonRepository;

use crate::common::{ExportError, Result, SpectralDistribution};
use std::collections::HashMap;

/// A dataset value: one spectrum, or a collection measured together.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Single(SpectralDistribution),
    Multi(Vec<SpectralDistribution>),
}

impl Entry {
    pub fn spectra(&self) -> &[SpectralDistribution] {
        match self {
            Entry::Single(sd) => std::slice::from_ref(sd),
            Entry::Multi(sds) => sds,
        }
    }
}

/// Named, ordered mapping from entry name to spectral data.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    name: String,
    entries: Vec<(String, Entry)>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Dataset {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts or replaces `key`, keeping the original position on replacement.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key, entry)),
        }
        self
    }

    pub fn with_spectrum(mut self, sd: SpectralDistribution) -> Self {
        let key = sd.name().to_owned();
        self.insert(key, Entry::Single(sd));
        self
    }

    pub fn get(&self, key: &str) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
            .ok_or_else(|| ExportError::EntryNotFound {
                dataset: self.name.clone(),
                entry: key.to_owned(),
            })
    }

    /// First spectrum stored under `key`.
    pub fn spectrum(&self, key: &str) -> Result<&SpectralDistribution> {
        self.get(key)?
            .spectra()
            .first()
            .ok_or_else(|| ExportError::EntryNotFound {
                dataset: self.name.clone(),
                entry: key.to_owned(),
            })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> + '_ {
        self.entries.iter().map(|(k, entry)| (k.as_str(), entry))
    }

    /// Every spectrum in entry order, collections flattened in place.
    pub fn spectra(&self) -> Vec<&SpectralDistribution> {
        self.entries
            .iter()
            .flat_map(|(_, entry)| entry.spectra())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keyed lookup of named spectral datasets.
pub trait DatasetRepository {
    fn load(&self, name: &str) -> Result<Dataset>;
}

/// Repository holding its datasets in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    datasets: HashMap<String, Dataset>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: Dataset) -> &mut Self {
        self.datasets.insert(dataset.name().to_owned(), dataset);
        self
    }
}

impl DatasetRepository for MemoryRepository {
    fn load(&self, name: &str) -> Result<Dataset> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| ExportError::DatasetNotFound(name.to_owned()))
    }
}
