use oxowl::{OwlError, OwlParseError};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error raised while reading an ontology document and its imports.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The given path does not exist or is not a regular file.
    #[error("The option `-o` doesn't point to a file: {}", .0.display())]
    NotAFile(PathBuf),
    /// The document could not be read.
    #[error("Unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The RDF syntax of the document cannot be guessed from its file extension.
    #[error("The file {} has no known ontology document extension", .0.display())]
    UnknownFormat(PathBuf),
    /// The document is not valid RDF or not a readable ontology.
    #[error("Invalid ontology document {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: OwlParseError,
    },
    /// The root document does not declare any `owl:Ontology`.
    #[error("Ontology doesn't have a URI.")]
    MissingIri,
    /// An `owl:imports` target was neither found locally nor fetched.
    #[error("Unable to resolve the import {iri}: {message}")]
    UnresolvedImport { iri: String, message: String },
}

/// An error raised by the graph store or while talking to it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP exchange itself failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The store answered with a non-empty `errors` array.
    #[error("{code}: \"{message}\"")]
    Server { code: String, message: String },
    /// The store answered something that is not a transactional envelope.
    #[error("Invalid response from the graph store: {0}")]
    InvalidResponse(String),
    /// The store did not tell where the opened transaction lives.
    #[error("The graph store did not return a transaction handle")]
    MissingHandle,
    /// The store refused the request with the given HTTP status.
    #[error("The graph store at {url} answered with status {status}")]
    Status { url: String, status: u16 },
    /// The transaction does not accept this operation in its current state.
    #[error("The transaction is {0} and can't be used for this operation")]
    InvalidState(crate::TransactionState),
}

/// The step of the import a store failure happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Check,
    Begin,
    Append,
    Commit,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Check => "checking the server",
            Self::Begin => "initiating the transaction",
            Self::Append => "sending a statement",
            Self::Commit => "committing the transaction",
        })
    }
}

/// An error that aborts the import of an ontology.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Reasoning(#[from] OwlError),
    /// The classified ontology is inconsistent, nothing is written.
    #[error("The ontology {0} is inconsistent")]
    Inconsistent(String),
    #[error("Error {stage}: {source}")]
    Store {
        stage: ImportStage,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    pub(crate) fn store(stage: ImportStage) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { stage, source }
    }
}
