use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("dataset {0:?} not found")]
    DatasetNotFound(String),

    #[error("entry {entry:?} not found in dataset {dataset:?}")]
    EntryNotFound { dataset: String, entry: String },

    #[error("malformed dataset {name:?}: {source}")]
    MalformedDataset {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid spectral shape: {0}")]
    InvalidShape(String),

    #[error("invalid spectral distribution {name:?}: {reason}")]
    InvalidSpectrum { name: String, reason: String },

    #[error("cannot normalize {name:?}: denominator is {denominator}")]
    DegenerateNormalization { name: String, denominator: f64 },

    #[error(
        "luminous flux normalization of {name:?} did not converge: \
         relative residual {residual:e} after {iterations} iterations"
    )]
    MinimizerNotConverged {
        name: String,
        residual: f64,
        iterations: usize,
    },

    #[error("identifier derived from {0:?} is empty")]
    MalformedIdentifier(String),

    #[error("duplicate id {0:?} in scene document")]
    DuplicateId(String),

    #[error("unknown bsdf type {0:?}")]
    UnknownBsdfType(String),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
