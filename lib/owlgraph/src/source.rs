//! Loading of an ontology document and of its import closure.

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::http::DocumentClient;
use oxiri::Iri;
use oxowl::{OntologyParser, Ontology, OwlClass};
use oxrdf::NamedNode;
use oxrdfio::RdfFormat;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const RDF_ACCEPT: &str = "application/rdf+xml, text/turtle;q=0.9, application/n-triples;q=0.8, application/ld+json;q=0.7, */*;q=0.1";

/// An ontology with the ontologies it imports, directly or not.
#[derive(Debug)]
pub struct LoadedOntology {
    document: PathBuf,
    ontology: Ontology,
    imports: Vec<Ontology>,
    merged: Ontology,
}

impl LoadedOntology {
    /// Builds from already parsed ontologies, `imports` being the import closure of `ontology`.
    pub fn new(
        document: impl Into<PathBuf>,
        ontology: Ontology,
        imports: Vec<Ontology>,
    ) -> Result<Self, SourceError> {
        if ontology.iri().is_none() {
            return Err(SourceError::MissingIri);
        }
        let mut merged = ontology.clone();
        for import in &imports {
            merged.merge(import);
        }
        Ok(Self {
            document: document.into(),
            ontology,
            imports,
            merged,
        })
    }

    /// The file the ontology was read from.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// The root ontology.
    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn iri(&self) -> Option<&NamedNode> {
        self.ontology.iri()
    }

    /// The import closure, in breadth-first order.
    pub fn imports(&self) -> &[Ontology] {
        &self.imports
    }

    /// The root ontology with the axioms of its whole import closure.
    pub fn merged(&self) -> &Ontology {
        &self.merged
    }

    /// The classes of the root ontology signature, or of its import closure signature.
    pub fn classes(&self, include_imports: bool) -> impl Iterator<Item = &OwlClass> {
        if include_imports {
            self.merged.classes()
        } else {
            self.ontology.classes()
        }
    }
}

/// Guesses the RDF syntax of an ontology document from its file extension.
pub fn format_from_path(path: &Path) -> Option<RdfFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "owl" | "rdf" | "xml" => Some(RdfFormat::RdfXml),
        extension => RdfFormat::from_extension(extension),
    }
}

/// Reads ontology documents and resolves their `owl:imports`.
///
/// Imports are looked for first among the ontology documents in the directory
/// of the root document (and its sub directories), matched on their ontology
/// IRI or version IRI, then downloaded from their IRI.
pub struct OntologyLoader {
    config: SourceConfig,
    client: Option<DocumentClient>,
}

impl OntologyLoader {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadedOntology, SourceError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SourceError::NotAFile(path.to_owned()));
        }
        let ontology = read_file(path)?;
        let Some(iri) = ontology.iri() else {
            return Err(SourceError::MissingIri);
        };
        info!(
            document = %path.display(),
            ontology = %iri,
            version = ontology.version_iri().map(|v| v.as_str()).unwrap_or_default(),
            "Ontology read"
        );

        let mut local = if self.config.local_imports() {
            let directory = match path.parent() {
                Some(directory) if !directory.as_os_str().is_empty() => directory,
                _ => Path::new("."),
            };
            index_directory(directory, path)
        } else {
            FxHashMap::default()
        };
        let mut visited = FxHashSet::default();
        mark_visited(&mut visited, &ontology);
        let mut queue = ontology.imports().iter().cloned().collect::<VecDeque<_>>();
        let mut imports = Vec::new();
        while let Some(import) = queue.pop_front() {
            if visited.contains(import.as_str()) {
                continue;
            }
            let imported = if let Some(imported) = local.remove(import.as_str()) {
                debug!(import = %import, "Import resolved from a local file");
                imported
            } else {
                self.fetch(&import)?
            };
            visited.insert(import.as_str().to_owned());
            mark_visited(&mut visited, &imported);
            queue.extend(imported.imports().iter().cloned());
            imports.push(imported);
        }
        debug!(imports = imports.len(), "Import closure loaded");
        LoadedOntology::new(path, ontology, imports)
    }

    fn fetch(&mut self, import: &NamedNode) -> Result<Ontology, SourceError> {
        let unresolved = |message: String| SourceError::UnresolvedImport {
            iri: import.as_str().to_owned(),
            message,
        };
        let client = match &mut self.client {
            Some(client) => client,
            client @ None => client.insert(
                DocumentClient::new(self.config.timeout()).map_err(|e| unresolved(e.to_string()))?,
            ),
        };
        info!(import = %import, "Downloading import");
        let (content_type, body) = client
            .get(import.as_str(), RDF_ACCEPT)
            .map_err(|e| unresolved(e.to_string()))?;
        let format = content_type
            .split(';')
            .next()
            .and_then(|media_type| RdfFormat::from_media_type(media_type.trim()))
            .or_else(|| format_from_path(Path::new(import.as_str())))
            .unwrap_or(RdfFormat::RdfXml);
        OntologyParser::parse_reader(format, body, Some(import.as_str())).map_err(|e| {
            unresolved(e.to_string())
        })
    }
}

fn mark_visited(visited: &mut FxHashSet<String>, ontology: &Ontology) {
    for iri in ontology.iri().into_iter().chain(ontology.version_iri()) {
        visited.insert(iri.as_str().to_owned());
    }
}

fn read_file(path: &Path) -> Result<Ontology, SourceError> {
    let format = format_from_path(path).ok_or_else(|| SourceError::UnknownFormat(path.to_owned()))?;
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse(format, BufReader::new(file), path)
}

fn parse(format: RdfFormat, reader: impl Read, path: &Path) -> Result<Ontology, SourceError> {
    let base_iri = fs::canonicalize(path)
        .ok()
        .and_then(|path| Iri::parse(format!("file://{}", path.display())).ok());
    OntologyParser::parse_reader(format, reader, base_iri.as_ref().map(Iri::as_str)).map_err(
        |source| SourceError::Parse {
            location: path.display().to_string(),
            source,
        },
    )
}

/// Parses every ontology document below `directory` except `root`, indexing them by IRI and version IRI.
fn index_directory(directory: &Path, root: &Path) -> FxHashMap<String, Ontology> {
    let mut index = FxHashMap::default();
    let mut directories = vec![directory.to_owned()];
    while let Some(directory) = directories.pop() {
        let Ok(entries) = fs::read_dir(&directory) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                directories.push(path);
                continue;
            }
            if path == root || format_from_path(&path).is_none() {
                continue;
            }
            match read_file(&path) {
                Ok(ontology) => {
                    for iri in ontology.iri().into_iter().chain(ontology.version_iri()) {
                        index.insert(iri.as_str().to_owned(), ontology.clone());
                    }
                }
                Err(e) => debug!(document = %path.display(), "Skipping local document: {e}"),
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs::write;
    use tempfile::tempdir;

    const ROOT: &str = r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
<http://example.org/root> a owl:Ontology ; owl:imports <http://example.org/a> .
<http://example.org/root#C> rdfs:subClassOf <http://example.org/a#B> .
"#;

    const A: &str = r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
<http://example.org/a> a owl:Ontology ; owl:imports <http://example.org/b>, <http://example.org/root> .
<http://example.org/a#B> a owl:Class ; rdfs:label "B" .
"#;

    const B: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
  <owl:Ontology rdf:about="http://example.org/b-latest">
    <owl:versionIRI rdf:resource="http://example.org/b"/>
  </owl:Ontology>
  <owl:Class rdf:about="http://example.org/b#D"/>
</rdf:RDF>"#;

    #[test]
    fn formats() {
        assert_eq!(format_from_path(Path::new("go.owl")), Some(RdfFormat::RdfXml));
        assert_eq!(format_from_path(Path::new("go.OWL")), Some(RdfFormat::RdfXml));
        assert_eq!(format_from_path(Path::new("pizza.ttl")), Some(RdfFormat::Turtle));
        assert_eq!(format_from_path(Path::new("pizza.nt")), Some(RdfFormat::NTriples));
        assert_eq!(format_from_path(Path::new("pizza.obo")), None);
        assert_eq!(format_from_path(Path::new("pizza")), None);
    }

    #[test]
    fn not_a_file() {
        let error = OntologyLoader::new(SourceConfig::default())
            .load("/this/file/does/not/exist.owl")
            .unwrap_err();
        assert!(matches!(error, SourceError::NotAFile(_)));
    }

    #[test]
    fn missing_iri() -> Result<(), Box<dyn Error>> {
        let directory = tempdir()?;
        let path = directory.path().join("anonymous.ttl");
        write(
            &path,
            "<http://example.org/A> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://example.org/B> .",
        )?;
        let error = OntologyLoader::new(SourceConfig::default()).load(&path).unwrap_err();
        assert_eq!(error.to_string(), "Ontology doesn't have a URI.");
        Ok(())
    }

    #[test]
    fn syntax_error() -> Result<(), Box<dyn Error>> {
        let directory = tempdir()?;
        let path = directory.path().join("broken.ttl");
        write(&path, "<http://example.org/A> a")?;
        let error = OntologyLoader::new(SourceConfig::default()).load(&path).unwrap_err();
        assert!(matches!(error, SourceError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn local_import_closure() -> Result<(), Box<dyn Error>> {
        let directory = tempdir()?;
        let root = directory.path().join("root.ttl");
        write(&root, ROOT)?;
        write(directory.path().join("a.ttl"), A)?;
        fs::create_dir(directory.path().join("deps"))?;
        write(directory.path().join("deps").join("b.owl"), B)?;
        write(directory.path().join("notes.txt"), "not an ontology")?;

        let loaded = OntologyLoader::new(SourceConfig::default()).load(&root)?;
        assert_eq!(loaded.iri().map(NamedNode::as_str), Some("http://example.org/root"));
        let imported = loaded
            .imports()
            .iter()
            .filter_map(|o| o.iri().map(NamedNode::as_str))
            .collect::<Vec<_>>();
        assert_eq!(imported, ["http://example.org/a", "http://example.org/b-latest"]);
        assert_eq!(loaded.classes(false).count(), 2);
        assert_eq!(loaded.classes(true).count(), 3);
        Ok(())
    }

    #[test]
    fn unresolvable_import() -> Result<(), Box<dyn Error>> {
        let directory = tempdir()?;
        let root = directory.path().join("root.ttl");
        write(
            &root,
            "<http://example.org/root> a <http://www.w3.org/2002/07/owl#Ontology> ; <http://www.w3.org/2002/07/owl#imports> <http://localhost:1/missing> .",
        )?;
        let error = OntologyLoader::new(SourceConfig::default().without_local_imports())
            .load(&root)
            .unwrap_err();
        assert!(
            matches!(&error, SourceError::UnresolvedImport { iri, .. } if iri == "http://localhost:1/missing"),
            "{error}"
        );
        Ok(())
    }
}
