use crate::config::{ImportConfig, StoreConfig};
use crate::error::{ImportError, ImportStage};
use crate::mutation::{GraphMutation, MutationBuilder};
use crate::source::LoadedOntology;
use crate::transaction::{Transaction, Transport};
use oxowl::{Reasoner, ReasonerConfig, StructuralReasoner};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span};

/// What an import wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Classes written to the graph
    pub classes: usize,
    /// Unsatisfiable classes left out
    pub skipped: usize,
    /// Statements accepted by the store
    pub statements: usize,
    pub elapsed: Duration,
}

/// Writes classified ontologies to a graph store, one transaction per ontology.
///
/// ```no_run
/// use owlgraph::{HttpTransport, ImportConfig, Importer, OntologyLoader, SourceConfig, StoreConfig};
///
/// let store = StoreConfig::new("http://localhost:7474")?.with_credentials("neo4j", "secret");
/// let transport = HttpTransport::new(&store)?;
/// transport.check_server()?;
/// let ontology = OntologyLoader::new(SourceConfig::default()).load("go.owl")?;
/// let report = Importer::new(&transport, &store).import(&ontology, &ImportConfig::new("Gene Ontology", "go"))?;
/// println!("{} classes imported", report.classes);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct Importer<T: Transport> {
    transport: T,
    transaction_url: String,
    reasoner_config: ReasonerConfig,
}

impl<T: Transport> Importer<T> {
    pub fn new(transport: T, store: &StoreConfig) -> Self {
        Self {
            transport,
            transaction_url: store.transaction_url(),
            reasoner_config: ReasonerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_reasoner_config(mut self, config: ReasonerConfig) -> Self {
        self.reasoner_config = config;
        self
    }

    /// Classifies the ontology with its import closure then writes it.
    pub fn import(
        &self,
        ontology: &LoadedOntology,
        config: &ImportConfig,
    ) -> Result<ImportReport, ImportError> {
        let span = info_span!("import", acronym = config.acronym());
        let _enter = span.enter();
        let start = Instant::now();
        let mut reasoner =
            StructuralReasoner::with_config(ontology.merged(), self.reasoner_config.clone());
        reasoner.classify()?;
        info!(elapsed = ?start.elapsed(), "Ontology classified");
        self.write(ontology, &reasoner, config)
    }

    /// Writes an ontology classified by `reasoner`.
    ///
    /// Nothing is sent if the ontology is inconsistent. Any store failure aborts
    /// the import, the statements already sent being left to the store.
    pub fn write(
        &self,
        ontology: &LoadedOntology,
        reasoner: &impl Reasoner,
        config: &ImportConfig,
    ) -> Result<ImportReport, ImportError> {
        let start = Instant::now();
        if !reasoner.is_consistent()? {
            return Err(ImportError::Inconsistent(
                ontology
                    .iri()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ));
        }
        let builder = MutationBuilder::new(config, ontology.ontology(), ontology.imports());
        let mut transaction = Transaction::new(&self.transport, self.transaction_url.as_str());
        transaction
            .begin()
            .map_err(ImportError::store(ImportStage::Begin))?;

        let mut send = |mutations: Vec<GraphMutation>| {
            for mutation in mutations {
                transaction
                    .append(&mutation.to_statement())
                    .map_err(ImportError::store(ImportStage::Append))?;
            }
            Ok::<_, ImportError>(())
        };
        send(builder.ontology_mutations())?;
        let mut classes = 0;
        let mut skipped = 0;
        for class in ontology.classes(config.include_imports()) {
            if class.is_thing() {
                continue;
            }
            if let Some(mutations) = builder.class_mutations(reasoner, class)? {
                send(mutations)?;
                classes += 1;
            } else {
                debug!(class = %class, "Skipping unsatisfiable class");
                skipped += 1;
            }
        }

        transaction
            .commit()
            .map_err(ImportError::store(ImportStage::Commit))?;
        let report = ImportReport {
            classes,
            skipped,
            statements: transaction.statement_count(),
            elapsed: start.elapsed(),
        };
        info!(
            classes = report.classes,
            skipped = report.skipped,
            statements = report.statements,
            elapsed = ?report.elapsed,
            "Ontology imported"
        );
        Ok(report)
    }
}
