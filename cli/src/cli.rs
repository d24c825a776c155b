use clap::{Parser, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "owl2graph")]
/// Imports classified OWL ontologies into a Neo4j compatible graph store
pub struct Args {
    /// OWL file to import
    #[arg(
        short,
        long,
        required_unless_present = "batch",
        value_hint = ValueHint::FilePath
    )]
    pub owl: Option<PathBuf>,
    /// Display name of the ontology
    #[arg(short, long, required_unless_present = "batch")]
    pub name: Option<String>,
    /// Acronym of the ontology
    ///
    /// It is upper-cased and used as label of the class nodes and as prefix of their identifiers.
    #[arg(short, long, required_unless_present = "batch")]
    pub abbreviation: Option<String>,
    /// Root URL of the graph store
    #[arg(short, long, default_value = "http://localhost:7474", value_hint = ValueHint::Url)]
    pub server: String,
    /// Path of the REST endpoint of the graph store
    #[arg(long, default_value = "/db/data")]
    pub endpoint: String,
    /// User name of the graph store
    #[arg(short, long, requires = "password")]
    pub user: Option<String>,
    /// Password of the graph store
    #[arg(short, long, requires = "user")]
    pub password: Option<String>,
    /// Object property whose existential restrictions become relationships
    ///
    /// Can be repeated.
    #[arg(long = "eqp", value_name = "IRI", value_hint = ValueHint::Url)]
    pub existential_properties: Vec<String>,
    /// Also imports the classes of the import closure
    #[arg(short, long = "incl-imports")]
    pub include_imports: bool,
    /// Never resolves the imports from the files next to the ontology
    #[arg(short = 'l', long)]
    pub no_local: bool,
    /// JSON file listing the ontologies to import
    ///
    /// It is either an array of `{"path", "name", "acronym", "includeClosure"}` objects
    /// or an object `{"server": "...", "ontologies": [...]}` whose server overrides --server.
    /// Relative paths are resolved against the directory of the file.
    #[arg(short, long, conflicts_with_all = ["owl", "name", "abbreviation"], value_hint = ValueHint::FilePath)]
    pub batch: Option<PathBuf>,
    /// Maximal duration of every HTTP exchange in seconds
    ///
    /// It applies to the graph store and to the download of the imports.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
    /// Maximal duration of the classification of an ontology in seconds
    #[arg(long, value_name = "SECONDS")]
    pub reasoner_timeout: Option<u64>,
    /// Logs debug messages
    #[arg(short, long)]
    pub verbose: bool,
    /// Format of the log messages written to stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    /// File in which every Cypher statement sent to the store is written
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub cypher_log: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
