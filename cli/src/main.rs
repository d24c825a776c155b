use crate::cli::{Args, LogFormat};
use anyhow::{Context, bail};
use clap::Parser;
use owlgraph::{
    CYPHER_LOG_TARGET, HttpTransport, ImportConfig, ImportError, ImportStage, Importer,
    OntologyLoader, SourceConfig, SourceError, StoreConfig,
};
use oxowl::ReasonerConfig;
use oxrdf::NamedNode;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    // Flushes the Cypher log whatever the outcome
    let _guard = init_logging(&args)?;
    run(args)
}

/// Installs the stderr logger and the optional Cypher log.
fn init_logging(args: &Args) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let console = match args.log_format {
        LogFormat::Text => fmt::layer().with_writer(io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
    };
    let (cypher, guard) = if let Some(path) = &args.cypher_log {
        let file = File::create(path)
            .with_context(|| format!("Failed to create the Cypher log {}", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .with_filter(Targets::new().with_target(CYPHER_LOG_TARGET, Level::DEBUG));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };
    tracing_subscriber::registry()
        .with(console.with_filter(filter))
        .with(cypher)
        .try_init()
        .context("Failed to install the logger")?;
    Ok(guard)
}

/// An ontology to import.
struct Job {
    path: PathBuf,
    config: ImportConfig,
}

fn run(args: Args) -> anyhow::Result<()> {
    let properties = args
        .existential_properties
        .iter()
        .map(|p| NamedNode::new(p).with_context(|| format!("Invalid --eqp IRI: {p}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let (server, jobs) = if let Some(batch) = &args.batch {
        let manifest = Manifest::load(batch)?;
        let base = batch.parent().unwrap_or_else(|| Path::new("."));
        let (server, entries) = manifest.into_parts();
        let jobs = entries
            .into_iter()
            .map(|entry| Job {
                path: base.join(entry.path),
                config: ImportConfig::new(entry.name, entry.acronym)
                    .with_import_closure(entry.include_closure.unwrap_or(args.include_imports))
                    .with_existential_properties(properties.iter().cloned()),
            })
            .collect::<Vec<_>>();
        (server.unwrap_or(args.server), jobs)
    } else {
        let (Some(path), Some(name), Some(acronym)) = (args.owl, args.name, args.abbreviation)
        else {
            bail!("The options -o, -n and -a are required when --batch is not given");
        };
        let config = ImportConfig::new(name, acronym)
            .with_import_closure(args.include_imports)
            .with_existential_properties(properties);
        (args.server, vec![Job { path, config }])
    };
    for job in &jobs {
        if !job.path.is_file() {
            return Err(SourceError::NotAFile(job.path.clone()).into());
        }
    }

    let mut store = StoreConfig::new(server.as_str())
        .with_context(|| format!("Invalid server URL: {server}"))?
        .with_endpoint(args.endpoint);
    if let (Some(user), Some(password)) = (args.user, args.password) {
        store = store.with_credentials(user, password);
    }
    let timeout = args.timeout.map(Duration::from_secs);
    if let Some(timeout) = timeout {
        store = store.with_timeout(timeout);
    }
    let transport = HttpTransport::new(&store).context("Failed to build the HTTP client")?;
    transport
        .check_server()
        .map_err(|source| ImportError::Store {
            stage: ImportStage::Check,
            source,
        })?;

    let mut source = SourceConfig::default();
    if args.no_local {
        source = source.without_local_imports();
    }
    if let Some(timeout) = timeout {
        source = source.with_timeout(timeout);
    }
    let mut loader = OntologyLoader::new(source);
    let importer = Importer::new(&transport, &store).with_reasoner_config(ReasonerConfig {
        timeout: args.reasoner_timeout.map(Duration::from_secs),
    });
    for job in &jobs {
        let start = Instant::now();
        let ontology = loader.load(&job.path)?;
        info!(
            path = %job.path.display(),
            imports = ontology.imports().len(),
            elapsed = ?start.elapsed(),
            "Ontology loaded"
        );
        let report = importer
            .import(&ontology, &job.config)
            .with_context(|| format!("Failed to import {}", job.path.display()))?;
        info!(
            acronym = job.config.acronym(),
            classes = report.classes,
            skipped = report.skipped,
            elapsed = ?start.elapsed(),
            "Import done"
        );
    }
    Ok(())
}

/// The content of a --batch file.
#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    Ontologies(Vec<ManifestEntry>),
    WithServer {
        server: Option<String>,
        ontologies: Vec<ManifestEntry>,
    },
}

#[derive(Deserialize)]
struct ManifestEntry {
    #[serde(alias = "o")]
    path: PathBuf,
    #[serde(alias = "n")]
    name: String,
    #[serde(alias = "a")]
    acronym: String,
    #[serde(default, rename = "includeClosure", alias = "i")]
    include_closure: Option<bool>,
}

impl Manifest {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open the batch file {}", path.display()))?;
        serde_json::from_reader(io::BufReader::new(file))
            .with_context(|| format!("Invalid batch file {}", path.display()))
    }

    fn into_parts(self) -> (Option<String>, Vec<ManifestEntry>) {
        match self {
            Self::Ontologies(ontologies) => (None, ontologies),
            Self::WithServer { server, ontologies } => (server, ontologies),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic_in_result_fn)]

    use super::*;

    #[test]
    fn manifest_array() -> anyhow::Result<()> {
        let manifest: Manifest = serde_json::from_str(
            r#"[{"path": "go.owl", "name": "Gene Ontology", "acronym": "go", "includeClosure": true}]"#,
        )?;
        let (server, entries) = manifest.into_parts();
        assert_eq!(server, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, Path::new("go.owl"));
        assert_eq!(entries[0].acronym, "go");
        assert_eq!(entries[0].include_closure, Some(true));
        Ok(())
    }

    #[test]
    fn manifest_with_server_and_short_keys() -> anyhow::Result<()> {
        let manifest: Manifest = serde_json::from_str(
            r#"{"server": "http://neo4j:7474", "ontologies": [{"o": "a.owl", "n": "A", "a": "a"}, {"o": "b.owl", "n": "B", "a": "b", "i": false}]}"#,
        )?;
        let (server, entries) = manifest.into_parts();
        assert_eq!(server.as_deref(), Some("http://neo4j:7474"));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "A");
        assert_eq!(entries[0].include_closure, None);
        assert_eq!(entries[1].include_closure, Some(false));
        Ok(())
    }

    #[test]
    fn manifest_without_acronym() {
        assert!(serde_json::from_str::<Manifest>(r#"[{"path": "go.owl", "name": "GO"}]"#).is_err());
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
