//! OWL 2 Ontology - container for axioms and declarations.

use crate::axiom::Axiom;
use crate::entity::OwlClass;
use crate::expression::ClassExpression;
use oxrdf::vocab::rdfs;
use oxrdf::{Literal, NamedNode};
use rustc_hash::{FxHashMap, FxHashSet};

/// An OWL 2 ontology.
///
/// An ontology is a collection of axioms describing classes, properties,
/// and individuals in a domain.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    /// The ontology IRI (optional)
    iri: Option<NamedNode>,

    /// The version IRI (optional)
    version_iri: Option<NamedNode>,

    /// Imported ontology IRIs
    imports: Vec<NamedNode>,

    /// All axioms in the ontology
    axioms: Vec<Axiom>,

    /// Classes in the signature, in order of first mention
    classes: Vec<OwlClass>,
    class_index: FxHashSet<OwlClass>,

    /// Positions of the `SubClassOf` axioms by named sub class
    sub_class_index: FxHashMap<OwlClass, Vec<usize>>,
    /// Position of the last `rdfs:label` assertion by subject
    label_index: FxHashMap<NamedNode, usize>,
}

impl Ontology {
    /// Creates a new empty ontology.
    pub fn new(iri: Option<NamedNode>) -> Self {
        Self {
            iri,
            ..Self::default()
        }
    }

    /// Returns the ontology IRI.
    pub fn iri(&self) -> Option<&NamedNode> {
        self.iri.as_ref()
    }

    /// Sets the ontology IRI.
    pub fn set_iri(&mut self, iri: Option<NamedNode>) {
        self.iri = iri;
    }

    /// Returns the version IRI.
    pub fn version_iri(&self) -> Option<&NamedNode> {
        self.version_iri.as_ref()
    }

    /// Sets the version IRI.
    pub fn set_version_iri(&mut self, iri: Option<NamedNode>) {
        self.version_iri = iri;
    }

    /// Returns the imported ontology IRIs.
    pub fn imports(&self) -> &[NamedNode] {
        &self.imports
    }

    /// Adds an import declaration.
    pub fn add_import(&mut self, iri: NamedNode) {
        if !self.imports.contains(&iri) {
            self.imports.push(iri);
        }
    }

    /// Adds an axiom to the ontology.
    ///
    /// Every named class the axiom mentions, at any depth, joins the signature.
    pub fn add_axiom(&mut self, axiom: Axiom) {
        if let Axiom::DeclareClass(c) = &axiom {
            self.declare_class(c);
        }
        let mut mentioned = Vec::new();
        axiom.for_each_class_expression(|expression| {
            expression.for_each_class(&mut |c| mentioned.push(c.clone()));
        });
        for class in &mentioned {
            self.declare_class(class);
        }
        let position = self.axioms.len();
        match &axiom {
            Axiom::SubClassOf {
                sub_class: ClassExpression::Class(c),
                ..
            } => self
                .sub_class_index
                .entry(c.clone())
                .or_default()
                .push(position),
            Axiom::AnnotationAssertion {
                property, subject, ..
            } if property.iri().as_ref() == rdfs::LABEL => {
                self.label_index.insert(subject.clone(), position);
            }
            _ => (),
        }
        self.axioms.push(axiom);
    }

    fn declare_class(&mut self, class: &OwlClass) {
        if self.class_index.insert(class.clone()) {
            self.classes.push(class.clone());
        }
    }

    /// Returns all axioms in the ontology.
    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    /// Returns the number of axioms.
    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    /// Returns the classes of the signature in order of first mention.
    pub fn classes(&self) -> impl Iterator<Item = &OwlClass> {
        self.classes.iter()
    }

    /// Checks if a class is in the signature of this ontology.
    pub fn contains_class(&self, class: &OwlClass) -> bool {
        self.class_index.contains(class)
    }

    /// Returns the super class expressions of the `SubClassOf` axioms whose
    /// sub class is exactly `class`.
    pub fn sub_class_axioms_for<'a>(
        &'a self,
        class: &OwlClass,
    ) -> impl Iterator<Item = &'a ClassExpression> {
        self.sub_class_index
            .get(class)
            .into_iter()
            .flatten()
            .filter_map(|&i| match &self.axioms[i] {
                Axiom::SubClassOf { super_class, .. } => Some(super_class),
                _ => None,
            })
    }

    /// Returns the `rdfs:label` of an IRI, the last asserted one winning.
    pub fn label_of(&self, subject: &NamedNode) -> Option<&Literal> {
        match &self.axioms[*self.label_index.get(subject)?] {
            Axiom::AnnotationAssertion { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Merges the axioms and imports of another ontology into this one.
    pub fn merge(&mut self, other: &Ontology) {
        for import in &other.imports {
            self.add_import(import.clone());
        }
        for axiom in &other.axioms {
            self.add_axiom(axiom.clone());
        }
    }
}

impl std::fmt::Display for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(iri) = &self.iri {
            write!(f, "Ontology({iri})")?;
        } else {
            write!(f, "Ontology(anonymous)")?;
        }
        write!(f, " [{} axioms]", self.axioms.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ObjectProperty;

    fn class(name: &str) -> OwlClass {
        OwlClass::new(NamedNode::new_unchecked(format!("http://example.org/{name}")))
    }

    #[test]
    fn signature_includes_nested_classes_once() {
        let mut ontology = Ontology::new(None);
        ontology.add_axiom(Axiom::DeclareClass(class("Pizza")));
        ontology.add_axiom(Axiom::subclass_of(
            class("Pizza"),
            ClassExpression::some_values_from(
                ObjectProperty::new(NamedNode::new_unchecked("http://example.org/hasTopping")),
                class("Mozzarella").into(),
            ),
        ));
        ontology.add_axiom(Axiom::subclass_of(class("Pizza"), class("Food")));
        let classes = ontology.classes().cloned().collect::<Vec<_>>();
        assert_eq!(classes, vec![class("Pizza"), class("Mozzarella"), class("Food")]);
        assert_eq!(ontology.sub_class_axioms_for(&class("Pizza")).count(), 2);
        assert_eq!(ontology.sub_class_axioms_for(&class("Food")).count(), 0);
    }

    #[test]
    fn last_label_wins() {
        let mut ontology = Ontology::new(None);
        let pizza = class("Pizza").into_inner();
        ontology.add_axiom(Axiom::label(pizza.clone(), Literal::new_simple_literal("first")));
        ontology.add_axiom(Axiom::label(
            pizza.clone(),
            Literal::new_language_tagged_literal_unchecked("Pizza", "en"),
        ));
        let label = ontology.label_of(&pizza);
        assert_eq!(label.map(Literal::value), Some("Pizza"));
        assert_eq!(label.and_then(Literal::language), Some("en"));
        assert!(ontology.label_of(class("Food").iri()).is_none());
    }

    #[test]
    fn indexes_follow_merges() {
        let pizza = class("Pizza");
        let mut import = Ontology::new(None);
        import.add_axiom(Axiom::subclass_of(pizza.clone(), class("Food")));
        import.add_axiom(Axiom::label(
            pizza.iri().clone(),
            Literal::new_simple_literal("Imported pizza"),
        ));
        let mut ontology = Ontology::new(None);
        ontology.add_axiom(Axiom::subclass_of(pizza.clone(), class("Dish")));
        ontology.add_axiom(Axiom::AnnotationAssertion {
            property: crate::entity::AnnotationProperty::new(NamedNode::new_unchecked(
                "http://www.w3.org/2000/01/rdf-schema#comment",
            )),
            subject: pizza.iri().clone(),
            value: Literal::new_simple_literal("not a label"),
        });
        assert!(ontology.label_of(pizza.iri()).is_none());
        ontology.merge(&import);
        let supers = ontology.sub_class_axioms_for(&pizza).collect::<Vec<_>>();
        assert_eq!(
            supers,
            vec![
                &ClassExpression::Class(class("Dish")),
                &ClassExpression::Class(class("Food"))
            ]
        );
        assert_eq!(
            ontology.label_of(pizza.iri()).map(Literal::value),
            Some("Imported pizza")
        );
    }

    #[test]
    fn many_classes() {
        let mut ontology = Ontology::new(None);
        for i in 0..20_000 {
            ontology.add_axiom(Axiom::subclass_of(class(&format!("C{i}")), class("Root")));
        }
        for i in 0..20_000 {
            assert_eq!(
                ontology
                    .sub_class_axioms_for(&class(&format!("C{i}")))
                    .count(),
                1
            );
        }
    }
}
