//! Imports classified OWL ontologies into a labeled property graph.
//!
//! Every satisfiable class becomes a `Class` node keyed by its URI and named by
//! a compact identifier (see [`normalize_id`]). Direct super classes,
//! equivalent classes and existential restrictions on chosen properties become
//! relationships. All writes are idempotent Cypher `MERGE`/`SET` statements sent
//! inside of a single transaction of a Neo4j compatible HTTP endpoint.
//!
//! ```no_run
//! use owlgraph::{HttpTransport, ImportConfig, Importer, OntologyLoader, SourceConfig, StoreConfig};
//! use oxrdf::NamedNode;
//!
//! let store = StoreConfig::default();
//! let transport = HttpTransport::new(&store)?;
//! let ontology = OntologyLoader::new(SourceConfig::default()).load("pizza.owl")?;
//! let config = ImportConfig::new("Pizza", "pizza").with_existential_property(NamedNode::new(
//!     "http://www.co-ode.org/ontologies/pizza/pizza.owl#hasTopping",
//! )?);
//! Importer::new(&transport, &store).import(&ontology, &config)?;
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod config;
mod error;
mod http;
mod id;
mod import;
mod mutation;
mod restriction;
mod source;
mod transaction;

pub use crate::config::{DEFAULT_ENDPOINT, DEFAULT_SERVER, ImportConfig, SourceConfig, StoreConfig};
pub use crate::error::{ImportError, ImportStage, SourceError, StoreError};
pub use crate::http::HttpTransport;
pub use crate::id::normalize_id;
pub use crate::import::{ImportReport, Importer};
pub use crate::mutation::{
    CLASS_LABEL, ClassEntity, EQUIVALENT_CLASS, GraphMutation, MutationBuilder, ONTOLOGY_LABEL,
    ROOT_CLASS_ID, SUB_CLASS_OF, Statement,
};
pub use crate::restriction::{Restriction, extract_restrictions};
pub use crate::source::{LoadedOntology, OntologyLoader, format_from_path};
pub use crate::transaction::{
    CYPHER_LOG_TARGET, Transaction, TransactionState, Transport, TransportResponse,
};
