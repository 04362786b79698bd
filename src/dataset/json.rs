use super::{Dataset, DatasetRepository, Entry};
use crate::common::{ExportError, Result, SpectralDistribution};
use crate::scene::writer::slugify;
use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
};

#[derive(Debug, Deserialize)]
struct SpectrumRecord {
    #[serde(default)]
    name: Option<String>,
    wavelengths: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntryRecord {
    Single(SpectrumRecord),
    Multi(Vec<SpectrumRecord>),
}

impl SpectrumRecord {
    fn into_sd(self, default_name: String) -> Result<SpectralDistribution> {
        SpectralDistribution::new(
            self.name.unwrap_or(default_name),
            self.wavelengths,
            self.values,
        )
    }
}

/// Datasets stored as `<root>/<slugify(name)>.json`.
///
/// A file is an object keyed by entry name; each value is either a spectrum
/// `{"name": .., "wavelengths": [..], "values": [..]}` (name optional, defaults
/// to the key) or a list of them. Entries are ordered by key.
#[derive(Clone, Debug)]
pub struct JsonRepository {
    root: PathBuf,
}

impl JsonRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonRepository { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", slugify(name)))
    }

    pub fn parse(name: &str, contents: &str) -> Result<Dataset> {
        let records: BTreeMap<String, EntryRecord> =
            serde_json::from_str(contents).map_err(|source| ExportError::MalformedDataset {
                name: name.to_owned(),
                source,
            })?;

        let mut dataset = Dataset::new(name);
        for (key, record) in records {
            let entry = match record {
                EntryRecord::Single(record) => Entry::Single(record.into_sd(key.clone())?),
                EntryRecord::Multi(records) => Entry::Multi(
                    records
                        .into_iter()
                        .enumerate()
                        .map(|(i, record)| record.into_sd(format!("{} {}", key, i + 1)))
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            dataset.insert(key, entry);
        }

        Ok(dataset)
    }
}

impl DatasetRepository for JsonRepository {
    fn load(&self, name: &str) -> Result<Dataset> {
        let path = self.path_for(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ExportError::DatasetNotFound(name.to_owned()))
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(name, &contents)
    }
}
