//! Idempotent graph mutations derived from a classified ontology.
//!
//! Every mutation is keyed by the URI of the nodes it touches and renders to a
//! single parameterized Cypher statement: URIs, labels and names always travel
//! as parameters, only node labels, property keys and relationship types are
//! part of the statement text, quoted as identifiers.

use crate::config::ImportConfig;
use crate::id::normalize_id;
use crate::restriction::extract_restrictions;
use oxowl::{OwlClass, OwlError, Ontology, Reasoner};
use oxrdf::Literal;
use serde::Serialize;
use serde_json::{Map, Value};

pub const CLASS_LABEL: &str = "Class";
pub const ONTOLOGY_LABEL: &str = "Ontology";
pub const ROOT_CLASS_ID: &str = "OWL:Thing";
pub const SUB_CLASS_OF: &str = "RDFS:subClassOf";
pub const EQUIVALENT_CLASS: &str = "OWL:equivalentClass";

/// A single write against the property graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphMutation {
    /// Creates the node labeled `label` with the given URI if it does not exist yet.
    CreateNode {
        label: String,
        id: String,
        uri: String,
    },
    /// Adds the label `new_label` to the node.
    PromoteLabel {
        label: String,
        uri: String,
        new_label: String,
    },
    /// Sets a property of the node, overwriting any previous value.
    SetProperty {
        label: String,
        uri: String,
        key: String,
        value: String,
    },
    /// Creates the relationship between two existing nodes if it does not exist yet.
    CreateRelationship {
        label: String,
        source_uri: String,
        target_uri: String,
        relationship_type: String,
    },
}

impl GraphMutation {
    /// Returns the URIs of the nodes this mutation touches.
    pub fn uris(&self) -> Vec<&str> {
        match self {
            Self::CreateNode { uri, .. }
            | Self::PromoteLabel { uri, .. }
            | Self::SetProperty { uri, .. } => vec![uri.as_str()],
            Self::CreateRelationship {
                source_uri,
                target_uri,
                ..
            } => vec![source_uri.as_str(), target_uri.as_str()],
        }
    }

    /// Renders the Cypher statement applying this mutation.
    pub fn to_statement(&self) -> Statement {
        match self {
            Self::CreateNode { label, id, uri } => Statement::new(
                format!(
                    "MERGE (n:{} {{uri: $uri}}) ON CREATE SET n.name = $name",
                    quote(label)
                ),
            )
            .with_parameter("uri", uri.as_str())
            .with_parameter("name", id.as_str()),
            Self::PromoteLabel {
                label,
                uri,
                new_label,
            } => Statement::new(format!(
                "MATCH (n:{} {{uri: $uri}}) SET n:{}",
                quote(label),
                quote(new_label)
            ))
            .with_parameter("uri", uri.as_str()),
            Self::SetProperty {
                label,
                uri,
                key,
                value,
            } => Statement::new(format!(
                "MATCH (n:{} {{uri: $uri}}) SET n.{} = $value",
                quote(label),
                quote(key)
            ))
            .with_parameter("uri", uri.as_str())
            .with_parameter("value", value.as_str()),
            Self::CreateRelationship {
                label,
                source_uri,
                target_uri,
                relationship_type,
            } => Statement::new(format!(
                "MATCH (src:{label} {{uri: $srcUri}}), (dest:{label} {{uri: $destUri}}) MERGE (src)-[:{}]->(dest)",
                quote(relationship_type),
                label = quote(label)
            ))
            .with_parameter("srcUri", source_uri.as_str())
            .with_parameter("destUri", target_uri.as_str()),
        }
    }
}

/// Quotes a Cypher identifier (label, property key or relationship type).
fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// A Cypher statement with its parameters, serialized as expected by the
/// transactional HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub statement: String,
    pub parameters: Map<String, Value>,
}

impl Statement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: Map::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// What is known of a class while its mutations are built.
#[derive(Debug, Clone)]
pub struct ClassEntity<'a> {
    pub uri: &'a str,
    pub id: String,
    pub label: Option<&'a Literal>,
    pub satisfiable: bool,
}

/// Builds the mutations of the ontology node and of each of its classes.
///
/// Unsatisfiable classes never appear in the built mutations, neither as a node
/// of their own nor as the end of a relationship.
pub struct MutationBuilder<'a> {
    config: &'a ImportConfig,
    ontology: &'a Ontology,
    imports: &'a [Ontology],
    namespace: &'a str,
}

impl<'a> MutationBuilder<'a> {
    /// `imports` are searched in order for the labels `ontology` does not give.
    pub fn new(config: &'a ImportConfig, ontology: &'a Ontology, imports: &'a [Ontology]) -> Self {
        Self {
            config,
            ontology,
            imports,
            namespace: ontology.iri().map_or("", |iri| iri.as_str()),
        }
    }

    /// The compact identifier of a class, `owl:Thing` being the shared root node.
    pub fn class_id(&self, class: &OwlClass) -> String {
        if class.is_thing() {
            ROOT_CLASS_ID.to_owned()
        } else {
            normalize_id(class.as_str(), self.config.acronym(), self.namespace)
        }
    }

    /// The ontology node with its metadata, then the root class node.
    pub fn ontology_mutations(&self) -> Vec<GraphMutation> {
        let mut mutations = Vec::new();
        if let Some(iri) = self.ontology.iri() {
            let uri = iri.as_str();
            self.create_node(&mut mutations, ONTOLOGY_LABEL, self.config.name(), uri);
            set_property(&mut mutations, ONTOLOGY_LABEL, uri, "acronym", self.config.acronym());
            set_property(&mut mutations, ONTOLOGY_LABEL, uri, "uri", uri);
            if let Some(version) = self.ontology.version_iri() {
                set_property(&mut mutations, ONTOLOGY_LABEL, uri, "version", version.as_str());
            }
        }
        let root = OwlClass::thing();
        self.create_node(&mut mutations, CLASS_LABEL, ROOT_CLASS_ID, root.as_str());
        mutations
    }

    pub fn entity<'c>(
        &self,
        reasoner: &impl Reasoner,
        class: &'c OwlClass,
    ) -> Result<ClassEntity<'c>, OwlError>
    where
        'a: 'c,
    {
        Ok(ClassEntity {
            uri: class.as_str(),
            id: self.class_id(class),
            label: self.label(class),
            satisfiable: reasoner.is_satisfiable(class)?,
        })
    }

    /// The mutations writing a class, its direct super classes, its restrictions
    /// and its equivalent classes.
    ///
    /// Returns `None` if the class is unsatisfiable.
    pub fn class_mutations(
        &self,
        reasoner: &impl Reasoner,
        class: &OwlClass,
    ) -> Result<Option<Vec<GraphMutation>>, OwlError> {
        let entity = self.entity(reasoner, class)?;
        if !entity.satisfiable {
            return Ok(None);
        }
        let mut mutations = Vec::new();
        self.create_node(&mut mutations, CLASS_LABEL, &entity.id, entity.uri);
        if let Some(label) = entity.label {
            set_property(&mut mutations, CLASS_LABEL, entity.uri, "rdfs:label", label.value());
            if let Some(language) = label.language() {
                set_property(&mut mutations, CLASS_LABEL, entity.uri, "labelLang", language);
            }
        }

        let groups = reasoner.direct_super_class_groups(class)?;
        if groups.is_empty() || groups.iter().any(|g| g.is_top()) {
            relate(&mut mutations, entity.uri, OwlClass::thing().as_str(), SUB_CLASS_OF);
        }
        for group in groups.iter().filter(|g| !g.is_top() && !g.is_bottom()) {
            for super_class in group.members().iter().filter(|c| !c.is_nothing()) {
                self.create_class_node(&mut mutations, super_class);
                relate(&mut mutations, entity.uri, super_class.as_str(), SUB_CLASS_OF);
            }
        }

        for restriction in extract_restrictions(
            reasoner.sub_class_axioms(class),
            self.config.existential_properties(),
        ) {
            if !reasoner.is_satisfiable(&restriction.filler)? {
                continue;
            }
            self.create_class_node(&mut mutations, &restriction.filler);
            let relationship_type = normalize_id(
                restriction.property.as_str(),
                self.config.acronym(),
                self.namespace,
            );
            relate(
                &mut mutations,
                entity.uri,
                restriction.filler.as_str(),
                &relationship_type,
            );
        }

        for equivalent in reasoner
            .equivalence_group(class)?
            .members()
            .iter()
            .filter(|c| *c != class)
        {
            self.create_class_node(&mut mutations, equivalent);
            relate(&mut mutations, equivalent.as_str(), entity.uri, EQUIVALENT_CLASS);
        }
        Ok(Some(mutations))
    }

    /// The `rdfs:label` of the class in the ontology, else in the first import giving a non-blank one.
    fn label(&self, class: &OwlClass) -> Option<&'a Literal> {
        let non_blank = |ontology: &'a Ontology| {
            ontology
                .label_of(class.iri())
                .filter(|label| !label.value().trim().is_empty())
        };
        non_blank(self.ontology).or_else(|| self.imports.iter().find_map(non_blank))
    }

    fn create_class_node(&self, mutations: &mut Vec<GraphMutation>, class: &OwlClass) {
        self.create_node(mutations, CLASS_LABEL, &self.class_id(class), class.as_str());
    }

    fn create_node(&self, mutations: &mut Vec<GraphMutation>, label: &str, id: &str, uri: &str) {
        mutations.push(GraphMutation::CreateNode {
            label: label.to_owned(),
            id: id.to_owned(),
            uri: uri.to_owned(),
        });
        mutations.push(GraphMutation::PromoteLabel {
            label: label.to_owned(),
            uri: uri.to_owned(),
            new_label: self.config.acronym().to_owned(),
        });
        set_property(mutations, label, uri, "name", id);
    }
}

fn set_property(
    mutations: &mut Vec<GraphMutation>,
    label: &str,
    uri: &str,
    key: &str,
    value: &str,
) {
    mutations.push(GraphMutation::SetProperty {
        label: label.to_owned(),
        uri: uri.to_owned(),
        key: key.to_owned(),
        value: value.to_owned(),
    });
}

fn relate(
    mutations: &mut Vec<GraphMutation>,
    source_uri: &str,
    target_uri: &str,
    relationship_type: &str,
) {
    mutations.push(GraphMutation::CreateRelationship {
        label: CLASS_LABEL.to_owned(),
        source_uri: source_uri.to_owned(),
        target_uri: target_uri.to_owned(),
        relationship_type: relationship_type.to_owned(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxowl::{Axiom, ClassExpression, ObjectProperty, StructuralReasoner};
    use oxrdf::NamedNode;

    const NS: &str = "http://example.org/pizza";

    fn class(name: &str) -> OwlClass {
        OwlClass::new(NamedNode::new_unchecked(format!("{NS}#{name}")))
    }

    fn has_topping() -> ObjectProperty {
        ObjectProperty::new(NamedNode::new_unchecked(format!("{NS}#hasTopping")))
    }

    fn config() -> ImportConfig {
        ImportConfig::new("Pizza", "pizza").with_existential_property(has_topping().iri().clone())
    }

    fn relationships<'m>(mutations: &'m [GraphMutation], kind: &str) -> Vec<(&'m str, &'m str)> {
        mutations
            .iter()
            .filter_map(|m| match m {
                GraphMutation::CreateRelationship {
                    source_uri,
                    target_uri,
                    relationship_type,
                    ..
                } if relationship_type == kind => Some((source_uri.as_str(), target_uri.as_str())),
                _ => None,
            })
            .collect()
    }

    fn pizza() -> Ontology {
        let mut ontology = Ontology::new(Some(NamedNode::new_unchecked(NS)));
        ontology.set_version_iri(Some(NamedNode::new_unchecked(format!("{NS}/1.0"))));
        ontology.add_axiom(Axiom::subclass_of(class("Pizza"), class("Food")));
        ontology.add_axiom(Axiom::subclass_of(
            class("Margherita"),
            ClassExpression::intersection(vec![
                class("Pizza").into(),
                ClassExpression::some_values_from(has_topping(), class("Mozzarella").into()),
            ]),
        ));
        ontology.add_axiom(Axiom::subclass_of(
            class("Margherita"),
            ClassExpression::some_values_from(has_topping(), class("Impossible").into()),
        ));
        ontology.add_axiom(Axiom::equivalent_classes(vec![
            class("Pizza").into(),
            class("Pie").into(),
        ]));
        ontology.add_axiom(Axiom::disjoint_classes(vec![
            class("Food").into(),
            class("Topping").into(),
        ]));
        ontology.add_axiom(Axiom::subclass_of(class("Impossible"), class("Food")));
        ontology.add_axiom(Axiom::subclass_of(class("Impossible"), class("Topping")));
        ontology.add_axiom(Axiom::label(
            class("Pizza").into_inner(),
            Literal::new_language_tagged_literal_unchecked("Pizza", "en"),
        ));
        ontology
    }

    #[test]
    fn statements_are_parameterized() {
        let statement = GraphMutation::SetProperty {
            label: "Class".into(),
            uri: "http://example.org/a'b".into(),
            key: "rdfs:label".into(),
            value: "it's \"quoted\"".into(),
        }
        .to_statement();
        assert_eq!(
            statement.statement,
            "MATCH (n:`Class` {uri: $uri}) SET n.`rdfs:label` = $value"
        );
        assert_eq!(statement.parameters["uri"], "http://example.org/a'b");
        assert_eq!(statement.parameters["value"], "it's \"quoted\"");

        let statement = GraphMutation::CreateRelationship {
            label: "Class".into(),
            source_uri: "http://example.org/a".into(),
            target_uri: "http://example.org/b".into(),
            relationship_type: "PIZZA:has`Topping".into(),
        }
        .to_statement();
        assert_eq!(
            statement.statement,
            "MATCH (src:`Class` {uri: $srcUri}), (dest:`Class` {uri: $destUri}) MERGE (src)-[:`PIZZA:has``Topping`]->(dest)"
        );
        assert_eq!(statement.parameters.len(), 2);
    }

    #[test]
    fn create_node_merges_on_uri() {
        let statement = GraphMutation::CreateNode {
            label: "Class".into(),
            id: "GO:0008150".into(),
            uri: "http://purl.obolibrary.org/obo/GO_0008150".into(),
        }
        .to_statement();
        assert_eq!(
            statement.statement,
            "MERGE (n:`Class` {uri: $uri}) ON CREATE SET n.name = $name"
        );
        assert_eq!(statement.parameters["name"], "GO:0008150");
        assert_eq!(
            serde_json::to_value(&statement).unwrap()["parameters"]["uri"],
            "http://purl.obolibrary.org/obo/GO_0008150"
        );
    }

    #[test]
    fn ontology_node() {
        let ontology = pizza();
        let config = config();
        let mutations = MutationBuilder::new(&config, &ontology, &[]).ontology_mutations();
        assert_eq!(
            mutations[0],
            GraphMutation::CreateNode {
                label: ONTOLOGY_LABEL.into(),
                id: "Pizza".into(),
                uri: NS.into(),
            }
        );
        assert!(mutations.contains(&GraphMutation::SetProperty {
            label: ONTOLOGY_LABEL.into(),
            uri: NS.into(),
            key: "version".into(),
            value: format!("{NS}/1.0"),
        }));
        assert!(mutations.contains(&GraphMutation::CreateNode {
            label: CLASS_LABEL.into(),
            id: ROOT_CLASS_ID.into(),
            uri: OwlClass::thing().as_str().into(),
        }));
    }

    #[test]
    fn class_without_super_class_gets_one_root_edge() -> Result<(), OwlError> {
        let ontology = pizza();
        let config = config();
        let mut reasoner = StructuralReasoner::new(&ontology);
        reasoner.classify()?;
        let builder = MutationBuilder::new(&config, &ontology, &[]);
        let mutations = builder.class_mutations(&reasoner, &class("Food"))?.unwrap();
        assert_eq!(
            relationships(&mutations, SUB_CLASS_OF),
            [(class("Food").as_str(), OwlClass::thing().as_str())]
        );
        Ok(())
    }

    #[test]
    fn equivalents_of_thing_give_one_root_edge() -> Result<(), OwlError> {
        let mut ontology = Ontology::new(Some(NamedNode::new_unchecked(NS)));
        ontology.add_axiom(Axiom::equivalent_classes(vec![
            class("Everything").into(),
            class("All").into(),
            OwlClass::thing().into(),
        ]));
        ontology.add_axiom(Axiom::subclass_of(class("Pizza"), class("Everything")));
        let config = config();
        let mut reasoner = StructuralReasoner::new(&ontology);
        reasoner.classify()?;
        let builder = MutationBuilder::new(&config, &ontology, &[]);
        let pizza = class("Pizza");
        let mutations = builder.class_mutations(&reasoner, &pizza)?.unwrap();
        assert_eq!(
            relationships(&mutations, SUB_CLASS_OF),
            [(pizza.as_str(), OwlClass::thing().as_str())]
        );
        Ok(())
    }

    #[test]
    fn class_mutations() -> Result<(), OwlError> {
        let ontology = pizza();
        let config = config();
        let mut reasoner = StructuralReasoner::new(&ontology);
        reasoner.classify()?;
        let builder = MutationBuilder::new(&config, &ontology, &[]);
        let margherita = class("Margherita");
        let mutations = builder.class_mutations(&reasoner, &margherita)?.unwrap();

        assert_eq!(
            &mutations[..3],
            [
                GraphMutation::CreateNode {
                    label: CLASS_LABEL.into(),
                    id: "PIZZA:Margherita".into(),
                    uri: margherita.as_str().into(),
                },
                GraphMutation::PromoteLabel {
                    label: CLASS_LABEL.into(),
                    uri: margherita.as_str().into(),
                    new_label: "PIZZA".into(),
                },
                GraphMutation::SetProperty {
                    label: CLASS_LABEL.into(),
                    uri: margherita.as_str().into(),
                    key: "name".into(),
                    value: "PIZZA:Margherita".into(),
                },
            ]
        );
        // Pizza and Pie are equivalent, both are direct super classes
        assert_eq!(
            relationships(&mutations, SUB_CLASS_OF),
            [
                (margherita.as_str(), class("Pie").as_str()),
                (margherita.as_str(), class("Pizza").as_str())
            ]
        );
        assert_eq!(
            relationships(&mutations, "PIZZA:hasTopping"),
            [(margherita.as_str(), class("Mozzarella").as_str())]
        );
        assert!(relationships(&mutations, EQUIVALENT_CLASS).is_empty());
        Ok(())
    }

    #[test]
    fn labels_and_equivalences() -> Result<(), OwlError> {
        let ontology = pizza();
        let config = config();
        let mut reasoner = StructuralReasoner::new(&ontology);
        reasoner.classify()?;
        let builder = MutationBuilder::new(&config, &ontology, &[]);
        let pizza = class("Pizza");
        let mutations = builder.class_mutations(&reasoner, &pizza)?.unwrap();
        assert!(mutations.contains(&GraphMutation::SetProperty {
            label: CLASS_LABEL.into(),
            uri: pizza.as_str().into(),
            key: "labelLang".into(),
            value: "en".into(),
        }));
        assert_eq!(
            relationships(&mutations, EQUIVALENT_CLASS),
            [(class("Pie").as_str(), pizza.as_str())]
        );
        Ok(())
    }

    #[test]
    fn label_from_imports() -> Result<(), OwlError> {
        let ontology = pizza();
        let mut import = Ontology::new(None);
        import.add_axiom(Axiom::label(
            class("Food").into_inner(),
            Literal::new_simple_literal("  "),
        ));
        let mut labelled = Ontology::new(None);
        labelled.add_axiom(Axiom::label(
            class("Food").into_inner(),
            Literal::new_simple_literal("Food"),
        ));
        let imports = [import, labelled];
        let config = config();
        let mut reasoner = StructuralReasoner::new(&ontology);
        reasoner.classify()?;
        let builder = MutationBuilder::new(&config, &ontology, &imports);
        let food = class("Food");
        let entity = builder.entity(&reasoner, &food)?;
        assert_eq!(entity.label.map(Literal::value), Some("Food"));
        let mutations = builder.class_mutations(&reasoner, &food)?.unwrap();
        assert!(
            !mutations
                .iter()
                .any(|m| matches!(m, GraphMutation::SetProperty { key, .. } if key == "labelLang"))
        );
        Ok(())
    }

    #[test]
    fn unsatisfiable_classes_are_never_referenced() -> Result<(), OwlError> {
        let ontology = pizza();
        let config = config();
        let mut reasoner = StructuralReasoner::new(&ontology);
        reasoner.classify()?;
        let builder = MutationBuilder::new(&config, &ontology, &[]);
        let impossible = class("Impossible");
        assert!(builder.class_mutations(&reasoner, &impossible)?.is_none());
        for class in ontology.classes() {
            for mutation in builder.class_mutations(&reasoner, class)?.unwrap_or_default() {
                assert!(!mutation.uris().contains(&impossible.as_str()));
            }
        }
        Ok(())
    }
}
