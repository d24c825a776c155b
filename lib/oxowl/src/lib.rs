//! OWL 2 class model for Oxigraph.
//!
//! This crate provides:
//! - an ontology data model focused on classes (classes, properties, class expressions, axioms)
//! - a parser reading this model from any RDF syntax supported by [`oxrdfio`]
//! - a structural classifier exposing satisfiability, equivalence groups and direct superclasses
//!
//! # Example
//! ```
//! use oxowl::{OntologyParser, OwlClass, Reasoner, StructuralReasoner};
//! use oxrdfio::RdfFormat;
//!
//! let ontology = OntologyParser::parse_reader(
//!     RdfFormat::Turtle,
//!     "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
//!      <http://example.org/Margherita> rdfs:subClassOf <http://example.org/Pizza> ."
//!         .as_bytes(),
//!     None,
//! )?;
//! let mut reasoner = StructuralReasoner::new(&ontology);
//! reasoner.classify()?;
//! let margherita = OwlClass::new_from_iri("http://example.org/Margherita")?;
//! assert!(reasoner.is_satisfiable(&margherita)?);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod axiom;
mod entity;
mod error;
mod expression;
mod ontology;
mod parser;
mod reasoner;

pub use axiom::Axiom;
pub use entity::{AnnotationProperty, Individual, ObjectProperty, OwlClass};
pub use error::{OwlError, OwlParseError, ReasoningError};
pub use expression::{ClassExpression, ObjectPropertyExpression};
pub use ontology::Ontology;
pub use parser::{OWL_NAMESPACE, OntologyParser, ParserConfig};
pub use reasoner::{ClassNode, Reasoner, ReasonerConfig, StructuralReasoner};
