//! Error types for OWL operations.

use oxrdfio::RdfParseError;

/// Errors that can occur during OWL operations.
#[derive(Debug, thiserror::Error)]
pub enum OwlError {
    /// Error parsing OWL from RDF.
    #[error(transparent)]
    Parse(#[from] OwlParseError),
    /// Error during reasoning.
    #[error(transparent)]
    Reasoning(#[from] ReasoningError),
}

/// Errors that can occur during OWL parsing from RDF.
#[derive(Debug, thiserror::Error)]
pub enum OwlParseError {
    /// The RDF document itself is invalid.
    #[error(transparent)]
    Rdf(#[from] RdfParseError),
    /// A property required by an OWL construct is missing.
    #[error("Missing required property {0}")]
    MissingProperty(&'static str),
    /// An RDF list is malformed or too long.
    #[error("Malformed RDF list: {0}")]
    MalformedList(String),
    /// A term cannot be read as the expected OWL construct.
    #[error("{0}")]
    InvalidValue(String),
}

/// Errors that can occur during reasoning.
#[derive(Debug, thiserror::Error)]
pub enum ReasoningError {
    /// The reasoner was queried before [`classify`](crate::Reasoner::classify) was called.
    #[error("The ontology has not been classified yet")]
    NotClassified,
    /// Classification took longer than the configured timeout.
    #[error("Classification timeout exceeded ({0:?})")]
    Timeout(std::time::Duration),
}
