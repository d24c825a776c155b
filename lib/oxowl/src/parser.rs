//! OWL 2 parser from RDF graphs.
//!
//! This module maps the RDF serialization of an OWL ontology (RDF/XML,
//! Turtle, N-Triples...) back to the structural model of [`Ontology`].

use crate::axiom::Axiom;
use crate::entity::{Individual, ObjectProperty, OwlClass};
use crate::error::OwlParseError;
use crate::expression::{ClassExpression, ObjectPropertyExpression};
use crate::ontology::Ontology;
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{BlankNodeRef, Graph, NamedNodeRef, NamedOrBlankNodeRef, TermRef, Triple, TripleRef};
use oxrdfio::{RdfFormat, RdfParser};
use rustc_hash::FxHashSet;
use std::io::Read;
use tracing::warn;

/// OWL 2 namespace.
pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

// OWL vocabulary constants
mod vocab {
    use oxrdf::NamedNodeRef;

    pub const CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
    pub const ONTOLOGY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
    pub const OBJECT_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const DATATYPE_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");
    pub const NAMED_INDIVIDUAL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#NamedIndividual");
    pub const RESTRICTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Restriction");
    pub const ALL_DISJOINT_CLASSES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#AllDisjointClasses");

    // Properties
    pub const IMPORTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#imports");
    pub const VERSION_IRI: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#versionIRI");
    pub const EQUIVALENT_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#equivalentClass");
    pub const DISJOINT_WITH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#disjointWith");
    pub const MEMBERS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#members");
    pub const INVERSE_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#inverseOf");

    // Restrictions
    pub const ON_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#onProperty");
    pub const SOME_VALUES_FROM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#someValuesFrom");
    pub const ALL_VALUES_FROM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#allValuesFrom");
    pub const HAS_VALUE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#hasValue");
    pub const MIN_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#minCardinality");
    pub const MAX_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#maxCardinality");
    pub const CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#cardinality");
    pub const MIN_QUALIFIED_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#minQualifiedCardinality");
    pub const MAX_QUALIFIED_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#maxQualifiedCardinality");
    pub const QUALIFIED_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#qualifiedCardinality");
    pub const ON_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#onClass");
    pub const ON_DATA_RANGE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#onDataRange");

    // Boolean combinations
    pub const INTERSECTION_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#intersectionOf");
    pub const UNION_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#unionOf");
    pub const COMPLEMENT_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#complementOf");
    pub const ONE_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#oneOf");
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum depth for parsing nested expressions.
    pub max_depth: usize,
    /// Maximum length for RDF lists.
    pub max_list_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_list_length: 10_000,
        }
    }
}

/// Parses an OWL ontology from an RDF graph.
///
/// ```
/// use oxowl::OntologyParser;
/// use oxrdfio::RdfFormat;
///
/// let ontology = OntologyParser::parse_reader(
///     RdfFormat::Turtle,
///     "<http://example.org/pizza> a <http://www.w3.org/2002/07/owl#Ontology> .
///      <http://example.org/pizza#Pizza> a <http://www.w3.org/2002/07/owl#Class> ."
///         .as_bytes(),
///     None,
/// )?;
/// assert_eq!(ontology.iri().map(|iri| iri.as_str()), Some("http://example.org/pizza"));
/// assert_eq!(ontology.classes().count(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct OntologyParser<'a> {
    graph: &'a Graph,
    config: ParserConfig,
    data_properties: FxHashSet<NamedNodeRef<'a>>,
}

impl<'a> OntologyParser<'a> {
    /// Creates a new parser for the given graph.
    pub fn new(graph: &'a Graph) -> Self {
        Self::with_config(graph, ParserConfig::default())
    }

    /// Creates a new parser with custom configuration.
    pub fn with_config(graph: &'a Graph, config: ParserConfig) -> Self {
        let data_properties = graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::DATATYPE_PROPERTY)
            .filter_map(|s| match s {
                NamedOrBlankNodeRef::NamedNode(n) => Some(n),
                NamedOrBlankNodeRef::BlankNode(_) => None,
            })
            .collect();
        Self {
            graph,
            config,
            data_properties,
        }
    }

    /// Reads an RDF document and parses the ontology it contains.
    pub fn parse_reader(
        format: RdfFormat,
        reader: impl Read,
        base_iri: Option<&str>,
    ) -> Result<Ontology, OwlParseError> {
        let mut parser = RdfParser::from_format(format);
        if let Some(base_iri) = base_iri {
            parser = parser
                .with_base_iri(base_iri)
                .map_err(|e| OwlParseError::InvalidValue(e.to_string()))?;
        }
        let mut graph = Graph::new();
        for quad in parser.for_reader(reader) {
            graph.insert(&Triple::from(quad?));
        }
        OntologyParser::new(&graph).parse()
    }

    /// Parses the ontology from the graph.
    pub fn parse(&self) -> Result<Ontology, OwlParseError> {
        let mut ontology = Ontology::new(None);

        // The ontology header
        for subject in self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::ONTOLOGY)
        {
            let NamedOrBlankNodeRef::NamedNode(iri) = subject else {
                continue;
            };
            if ontology.iri().is_some() {
                warn!("Several ontology headers found, keeping the first one");
                break;
            }
            ontology.set_iri(Some(iri.into_owned()));
            for import in self.graph.objects_for_subject_predicate(iri, vocab::IMPORTS) {
                if let TermRef::NamedNode(import) = import {
                    ontology.add_import(import.into_owned());
                }
            }
            if let Some(TermRef::NamedNode(version)) = self
                .graph
                .object_for_subject_predicate(iri, vocab::VERSION_IRI)
            {
                ontology.set_version_iri(Some(version.into_owned()));
            }
        }

        self.parse_declarations(&mut ontology);
        self.parse_class_axioms(&mut ontology)?;
        self.parse_labels(&mut ontology);
        self.parse_class_assertions(&mut ontology)?;
        Ok(ontology)
    }

    fn parse_declarations(&self, ontology: &mut Ontology) {
        for triple in self.graph.triples_for_predicate(rdf::TYPE) {
            let (NamedOrBlankNodeRef::NamedNode(subject), TermRef::NamedNode(class)) =
                (triple.subject, triple.object)
            else {
                continue;
            };
            let node = subject.into_owned();
            if class == vocab::CLASS || class == rdfs::CLASS {
                ontology.add_axiom(Axiom::DeclareClass(OwlClass::new(node)));
            } else if class == vocab::OBJECT_PROPERTY {
                ontology.add_axiom(Axiom::DeclareObjectProperty(ObjectProperty::new(node)));
            } else if class == vocab::NAMED_INDIVIDUAL {
                ontology.add_axiom(Axiom::DeclareNamedIndividual(Individual::Named(node)));
            }
        }
    }

    fn parse_class_axioms(&self, ontology: &mut Ontology) -> Result<(), OwlParseError> {
        for triple in self.graph.triples_for_predicate(rdfs::SUB_CLASS_OF) {
            if let Some((sub_class, super_class)) =
                self.parse_pair(triple.subject.into(), triple.object)?
            {
                ontology.add_axiom(Axiom::SubClassOf {
                    sub_class,
                    super_class,
                });
            }
        }
        for triple in self.graph.triples_for_predicate(vocab::EQUIVALENT_CLASS) {
            if let Some((left, right)) = self.parse_pair(triple.subject.into(), triple.object)? {
                ontology.add_axiom(Axiom::EquivalentClasses(vec![left, right]));
            }
        }
        for triple in self.graph.triples_for_predicate(vocab::DISJOINT_WITH) {
            if let Some((left, right)) = self.parse_pair(triple.subject.into(), triple.object)? {
                ontology.add_axiom(Axiom::DisjointClasses(vec![left, right]));
            }
        }
        for subject in self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::ALL_DISJOINT_CLASSES)
        {
            let Some(members) = self.graph.object_for_subject_predicate(subject, vocab::MEMBERS)
            else {
                continue;
            };
            let mut classes = Vec::new();
            for member in self.parse_list(members)? {
                if let Some(class) = self.lenient_class_expression(member, 0)? {
                    classes.push(class);
                }
            }
            ontology.add_axiom(Axiom::DisjointClasses(classes));
        }
        Ok(())
    }

    /// Parses both sides of a class axiom, skipping the axiom if one side
    /// is not a class expression this parser understands.
    fn parse_pair(
        &self,
        left: TermRef<'_>,
        right: TermRef<'_>,
    ) -> Result<Option<(ClassExpression, ClassExpression)>, OwlParseError> {
        let Some(left) = self.lenient_class_expression(left, 0)? else {
            return Ok(None);
        };
        let Some(right) = self.lenient_class_expression(right, 0)? else {
            return Ok(None);
        };
        Ok(Some((left, right)))
    }

    fn lenient_class_expression(
        &self,
        term: TermRef<'_>,
        depth: usize,
    ) -> Result<Option<ClassExpression>, OwlParseError> {
        match self.parse_class_expression(term, depth) {
            Ok(expression) => Ok(Some(expression)),
            Err(OwlParseError::InvalidValue(message)) => {
                warn!("Skipping an unsupported class expression: {message}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn parse_labels(&self, ontology: &mut Ontology) {
        for triple in self.graph.triples_for_predicate(rdfs::LABEL) {
            if let (NamedOrBlankNodeRef::NamedNode(subject), TermRef::Literal(value)) =
                (triple.subject, triple.object)
            {
                ontology.add_axiom(Axiom::label(subject.into_owned(), value.into_owned()));
            }
        }
    }

    fn parse_class_assertions(&self, ontology: &mut Ontology) -> Result<(), OwlParseError> {
        let individuals = self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::NAMED_INDIVIDUAL)
            .collect::<Vec<_>>();
        for individual in individuals {
            let NamedOrBlankNodeRef::NamedNode(individual) = individual else {
                continue;
            };
            for class in self.graph.objects_for_subject_predicate(individual, rdf::TYPE) {
                if let TermRef::NamedNode(class) = class {
                    if class.as_str().starts_with(OWL_NAMESPACE) {
                        continue;
                    }
                }
                if let Some(class) = self.lenient_class_expression(class, 0)? {
                    ontology.add_axiom(Axiom::ClassAssertion {
                        class,
                        individual: Individual::Named(individual.into_owned()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parses a class expression from a term.
    fn parse_class_expression(
        &self,
        term: TermRef<'_>,
        depth: usize,
    ) -> Result<ClassExpression, OwlParseError> {
        if depth > self.config.max_depth {
            return Err(OwlParseError::InvalidValue(
                "Class expression nested too deeply".into(),
            ));
        }
        match term {
            TermRef::NamedNode(n) => Ok(ClassExpression::Class(OwlClass::new(n.into_owned()))),
            TermRef::BlankNode(b) => self.parse_anonymous_class(b, depth),
            _ => Err(OwlParseError::InvalidValue(format!(
                "{term} cannot be a class expression"
            ))),
        }
    }

    /// Parses an anonymous class expression (restriction or boolean).
    fn parse_anonymous_class(
        &self,
        bnode: BlankNodeRef<'_>,
        depth: usize,
    ) -> Result<ClassExpression, OwlParseError> {
        if self.graph.contains(TripleRef::new(
            bnode,
            rdf::TYPE,
            vocab::RESTRICTION,
        )) || self
            .graph
            .object_for_subject_predicate(bnode, vocab::ON_PROPERTY)
            .is_some()
        {
            return self.parse_restriction(bnode, depth);
        }

        for triple in self.graph.triples_for_subject(bnode) {
            if triple.predicate == vocab::INTERSECTION_OF {
                return Ok(ClassExpression::ObjectIntersectionOf(
                    self.parse_class_list(triple.object, depth)?,
                ));
            } else if triple.predicate == vocab::UNION_OF {
                return Ok(ClassExpression::ObjectUnionOf(
                    self.parse_class_list(triple.object, depth)?,
                ));
            } else if triple.predicate == vocab::COMPLEMENT_OF {
                return Ok(ClassExpression::complement(
                    self.parse_class_expression(triple.object, depth + 1)?,
                ));
            } else if triple.predicate == vocab::ONE_OF {
                let individuals = self
                    .parse_list(triple.object)?
                    .into_iter()
                    .map(term_to_individual)
                    .collect::<Result<_, _>>()?;
                return Ok(ClassExpression::ObjectOneOf(individuals));
            }
        }

        Err(OwlParseError::InvalidValue(format!(
            "Cannot parse anonymous class {bnode}"
        )))
    }

    /// Parses an OWL restriction.
    fn parse_restriction(
        &self,
        bnode: BlankNodeRef<'_>,
        depth: usize,
    ) -> Result<ClassExpression, OwlParseError> {
        let property = match self
            .graph
            .object_for_subject_predicate(bnode, vocab::ON_PROPERTY)
        {
            Some(TermRef::NamedNode(p)) => {
                if self.data_properties.contains(&p) {
                    return Ok(ClassExpression::DataRestriction(p.into_owned()));
                }
                ObjectPropertyExpression::ObjectProperty(ObjectProperty::new(p.into_owned()))
            }
            Some(TermRef::BlankNode(p)) => {
                match self.graph.object_for_subject_predicate(p, vocab::INVERSE_OF) {
                    Some(TermRef::NamedNode(inverse)) => {
                        ObjectPropertyExpression::inverse(ObjectProperty::new(inverse.into_owned()))
                    }
                    _ => {
                        return Err(OwlParseError::InvalidValue(format!(
                            "Unsupported property expression {p}"
                        )));
                    }
                }
            }
            _ => return Err(OwlParseError::MissingProperty("owl:onProperty")),
        };
        if self
            .graph
            .object_for_subject_predicate(bnode, vocab::ON_DATA_RANGE)
            .is_some()
        {
            return Ok(ClassExpression::DataRestriction(
                property_iri(&property).into_owned(),
            ));
        }

        if let Some(filler) = self
            .graph
            .object_for_subject_predicate(bnode, vocab::SOME_VALUES_FROM)
        {
            if is_data_range(filler) {
                return Ok(ClassExpression::DataRestriction(
                    property_iri(&property).into_owned(),
                ));
            }
            return Ok(ClassExpression::ObjectSomeValuesFrom {
                property,
                filler: Box::new(self.parse_class_expression(filler, depth + 1)?),
            });
        }
        if let Some(filler) = self
            .graph
            .object_for_subject_predicate(bnode, vocab::ALL_VALUES_FROM)
        {
            if is_data_range(filler) {
                return Ok(ClassExpression::DataRestriction(
                    property_iri(&property).into_owned(),
                ));
            }
            return Ok(ClassExpression::ObjectAllValuesFrom {
                property,
                filler: Box::new(self.parse_class_expression(filler, depth + 1)?),
            });
        }
        if let Some(value) = self
            .graph
            .object_for_subject_predicate(bnode, vocab::HAS_VALUE)
        {
            if matches!(value, TermRef::Literal(_)) {
                return Ok(ClassExpression::DataRestriction(
                    property_iri(&property).into_owned(),
                ));
            }
            return Ok(ClassExpression::ObjectHasValue {
                property,
                individual: term_to_individual(value)?,
            });
        }

        let filler = self
            .graph
            .object_for_subject_predicate(bnode, vocab::ON_CLASS)
            .map(|c| self.parse_class_expression(c, depth + 1).map(Box::new))
            .transpose()?;
        let cardinality = |predicates: [NamedNodeRef<'static>; 2]| {
            predicates.into_iter().find_map(|p| {
                match self.graph.object_for_subject_predicate(bnode, p) {
                    Some(TermRef::Literal(value)) => value.value().parse::<u32>().ok(),
                    _ => None,
                }
            })
        };
        if let Some(cardinality) =
            cardinality([vocab::MIN_CARDINALITY, vocab::MIN_QUALIFIED_CARDINALITY])
        {
            return Ok(ClassExpression::ObjectMinCardinality {
                cardinality,
                property,
                filler,
            });
        }
        if let Some(cardinality) =
            cardinality([vocab::MAX_CARDINALITY, vocab::MAX_QUALIFIED_CARDINALITY])
        {
            return Ok(ClassExpression::ObjectMaxCardinality {
                cardinality,
                property,
                filler,
            });
        }
        if let Some(cardinality) = cardinality([vocab::CARDINALITY, vocab::QUALIFIED_CARDINALITY])
        {
            return Ok(ClassExpression::ObjectExactCardinality {
                cardinality,
                property,
                filler,
            });
        }

        Err(OwlParseError::InvalidValue(format!(
            "Unknown restriction type for {bnode}"
        )))
    }

    /// Parses an RDF list of class expressions.
    fn parse_class_list(
        &self,
        head: TermRef<'a>,
        depth: usize,
    ) -> Result<Vec<ClassExpression>, OwlParseError> {
        self.parse_list(head)?
            .into_iter()
            .map(|t| self.parse_class_expression(t, depth + 1))
            .collect()
    }

    /// Reads the members of an RDF list.
    fn parse_list(&self, head: TermRef<'a>) -> Result<Vec<TermRef<'a>>, OwlParseError> {
        let mut result = Vec::new();
        let mut current = head;
        loop {
            let node: NamedOrBlankNodeRef<'_> = match current {
                TermRef::NamedNode(n) if n == rdf::NIL => return Ok(result),
                TermRef::NamedNode(n) => n.into(),
                TermRef::BlankNode(b) => b.into(),
                _ => {
                    return Err(OwlParseError::MalformedList(format!(
                        "{current} is not a list node"
                    )));
                }
            };
            if result.len() >= self.config.max_list_length {
                return Err(OwlParseError::MalformedList("List too long".into()));
            }
            result.push(
                self.graph
                    .object_for_subject_predicate(node, rdf::FIRST)
                    .ok_or_else(|| OwlParseError::MalformedList("Missing rdf:first".into()))?,
            );
            current = self
                .graph
                .object_for_subject_predicate(node, rdf::REST)
                .ok_or_else(|| OwlParseError::MalformedList("Missing rdf:rest".into()))?;
        }
    }
}

fn property_iri(property: &ObjectPropertyExpression) -> NamedNodeRef<'_> {
    match property {
        ObjectPropertyExpression::ObjectProperty(p) => p.iri().as_ref(),
        ObjectPropertyExpression::ObjectInverseOf(p) => p.iri().as_ref(),
    }
}

/// Datatypes and `rdfs:Literal` are data ranges, not classes.
fn is_data_range(term: TermRef<'_>) -> bool {
    match term {
        TermRef::NamedNode(n) => {
            n == rdfs::LITERAL || n == rdf::LANG_STRING || n.as_str().starts_with(XSD_NAMESPACE)
        }
        _ => false,
    }
}

/// Converts a term to an individual.
fn term_to_individual(term: TermRef<'_>) -> Result<Individual, OwlParseError> {
    match term {
        TermRef::NamedNode(n) => Ok(Individual::Named(n.into_owned())),
        TermRef::BlankNode(b) => Ok(Individual::Anonymous(b.into_owned())),
        _ => Err(OwlParseError::InvalidValue(format!(
            "{term} cannot be an individual"
        ))),
    }
}
