//! Immutable settings of an import, built once and handed to each component.

use oxiri::{Iri, IriParseError};
use oxrdf::NamedNode;
use rustc_hash::FxHashSet;
use std::time::Duration;

pub const DEFAULT_SERVER: &str = "http://localhost:7474";
pub const DEFAULT_ENDPOINT: &str = "/db/data";

/// What to import and how to name it in the graph.
///
/// ```
/// use owlgraph::ImportConfig;
/// use oxrdf::NamedNode;
///
/// let config = ImportConfig::new("Pizza Ontology", "pizza").with_existential_property(
///     NamedNode::new("http://www.co-ode.org/ontologies/pizza/pizza.owl#hasTopping")?,
/// );
/// assert_eq!(config.acronym(), "PIZZA");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct ImportConfig {
    name: String,
    acronym: String,
    include_imports: bool,
    existential_properties: FxHashSet<NamedNode>,
}

impl ImportConfig {
    /// The acronym is upper-cased, it is used as the node label of every imported class.
    pub fn new(name: impl Into<String>, acronym: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            acronym: acronym.as_ref().to_uppercase(),
            include_imports: false,
            existential_properties: FxHashSet::default(),
        }
    }

    /// Also imports the classes of the import closure, not only the ones of the root ontology.
    #[must_use]
    pub fn with_import_closure(mut self, include_imports: bool) -> Self {
        self.include_imports = include_imports;
        self
    }

    /// Turns `someValuesFrom` restrictions on this property into relationships.
    #[must_use]
    pub fn with_existential_property(mut self, property: NamedNode) -> Self {
        self.existential_properties.insert(property);
        self
    }

    #[must_use]
    pub fn with_existential_properties(
        mut self,
        properties: impl IntoIterator<Item = NamedNode>,
    ) -> Self {
        self.existential_properties.extend(properties);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn acronym(&self) -> &str {
        &self.acronym
    }

    pub fn include_imports(&self) -> bool {
        self.include_imports
    }

    pub fn existential_properties(&self) -> &FxHashSet<NamedNode> {
        &self.existential_properties
    }
}

/// Where the graph store lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    server: String,
    endpoint: String,
    credentials: Option<(String, String)>,
    timeout: Option<Duration>,
}

impl StoreConfig {
    /// Validates the server root URL, e.g. `http://localhost:7474`.
    pub fn new(server: impl Into<String>) -> Result<Self, IriParseError> {
        let server = Iri::parse(server.into())?.into_inner();
        Ok(Self {
            server: server.trim_end_matches('/').to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            credentials: None,
            timeout: None,
        })
    }

    /// Sets the path of the REST API below the server root.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = format!("/{}", endpoint.trim_matches('/'));
        self
    }

    /// Uses HTTP basic authentication.
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), password.into()));
        self
    }

    /// Bounds the duration of every HTTP exchange. There is no limit by default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// The REST API root, i.e. the server URL followed by the endpoint path.
    pub fn rest_url(&self) -> String {
        format!("{}{}", self.server, self.endpoint)
    }

    /// The URL transactions are opened at.
    pub fn transaction_url(&self) -> String {
        format!("{}{}/transaction", self.server, self.endpoint)
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(user, password)| (user.as_str(), password.as_str()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            credentials: None,
            timeout: None,
        }
    }
}

/// How ontology documents and their imports are looked up.
#[derive(Debug, Clone, Copy)]
pub struct SourceConfig {
    local_imports: bool,
    timeout: Option<Duration>,
}

impl SourceConfig {
    /// Never resolves `owl:imports` from the files next to the ontology document,
    /// always fetching them from their IRI.
    #[must_use]
    pub fn without_local_imports(mut self) -> Self {
        self.local_imports = false;
        self
    }

    /// Bounds the duration of the download of every import.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn local_imports(&self) -> bool {
        self.local_imports
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            local_imports: true,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_urls() -> Result<(), IriParseError> {
        let config = StoreConfig::new("http://neo4j.example.com:7474/")?.with_endpoint("db/data/");
        assert_eq!(config.server(), "http://neo4j.example.com:7474");
        assert_eq!(config.rest_url(), "http://neo4j.example.com:7474/db/data");
        assert_eq!(
            config.transaction_url(),
            "http://neo4j.example.com:7474/db/data/transaction"
        );
        assert!(config.credentials().is_none());
        Ok(())
    }

    #[test]
    fn invalid_server() {
        StoreConfig::new("not a url").unwrap_err();
    }

    #[test]
    fn default_store() {
        let config = StoreConfig::default();
        assert_eq!(config.transaction_url(), "http://localhost:7474/db/data/transaction");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn timeouts() -> Result<(), IriParseError> {
        let store = StoreConfig::new("http://localhost:7474")?.with_timeout(Duration::from_secs(3));
        assert_eq!(store.timeout(), Some(Duration::from_secs(3)));
        let source = SourceConfig::default()
            .without_local_imports()
            .with_timeout(Duration::from_secs(5));
        assert!(!source.local_imports());
        assert_eq!(source.timeout(), Some(Duration::from_secs(5)));
        Ok(())
    }

    #[test]
    fn acronym_is_upper_cased() {
        let config = ImportConfig::new("Gene Ontology", "go");
        assert_eq!(config.acronym(), "GO");
        assert_eq!(config.name(), "Gene Ontology");
        assert!(!config.include_imports());
    }
}
