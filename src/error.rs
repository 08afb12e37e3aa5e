use thiserror::Error;

/// Fatal for the whole run: the reference data cannot support the case data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogFault {
    #[error("no population entry for country {code}")]
    MissingPopulation { code: String },
    #[error("population for country {code} must be positive, got {population}")]
    InvalidPopulation { code: String, population: u64 },
    #[error("duplicate population entry for country {code}")]
    DuplicateEntry { code: String },
}

/// Per-country; the country is left out of the table and the map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationFault {
    #[error("{country}: only {available} daily records, {required} needed")]
    InsufficientHistory {
        country: String,
        available: usize,
        required: usize,
    },
    #[error("{country}: no cases in the oldest reference week, change is undefined")]
    ZeroBaseline { country: String },
}

/// Per-country; only the map coloring is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderFault {
    #[error("no map element with id \"{id}\"")]
    ElementNotFound { id: String },
    #[error("{count} map elements with id \"{id}\"")]
    AmbiguousElement { id: String, count: usize },
    #[error("map element \"{id}\" has no style attribute")]
    MissingStyle { id: String },
}

/// Recoverable faults collected over a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    #[error(transparent)]
    Computation(#[from] ComputationFault),
    #[error(transparent)]
    Render(#[from] RenderFault),
}
