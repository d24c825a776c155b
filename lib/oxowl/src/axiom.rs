//! OWL 2 axiom types.
//!
//! Only the axioms that shape a class hierarchy are modelled; everything else
//! found in a document is ignored by the parser.

use crate::entity::{AnnotationProperty, Individual, ObjectProperty, OwlClass};
use crate::expression::ClassExpression;
use oxrdf::{Literal, NamedNode};

/// An OWL 2 axiom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axiom {
    /// SubClassOf(sub, super) - sub is a subclass of super
    SubClassOf {
        sub_class: ClassExpression,
        super_class: ClassExpression,
    },

    /// EquivalentClasses(C1, C2, ...) - all classes are equivalent
    EquivalentClasses(Vec<ClassExpression>),

    /// DisjointClasses(C1, C2, ...) - classes have no common instances
    DisjointClasses(Vec<ClassExpression>),

    /// ClassAssertion(C, a) - a is an instance of C
    ClassAssertion {
        class: ClassExpression,
        individual: Individual,
    },

    /// AnnotationAssertion(P, s, v) on an IRI subject
    AnnotationAssertion {
        property: AnnotationProperty,
        subject: NamedNode,
        value: Literal,
    },

    /// Declaration(Class(C))
    DeclareClass(OwlClass),

    /// Declaration(ObjectProperty(P))
    DeclareObjectProperty(ObjectProperty),

    /// Declaration(NamedIndividual(a))
    DeclareNamedIndividual(Individual),
}

impl Axiom {
    /// Creates a SubClassOf axiom.
    pub fn subclass_of(sub: impl Into<ClassExpression>, sup: impl Into<ClassExpression>) -> Self {
        Self::SubClassOf {
            sub_class: sub.into(),
            super_class: sup.into(),
        }
    }

    /// Creates a ClassAssertion axiom.
    pub fn class_assertion(
        class: impl Into<ClassExpression>,
        individual: impl Into<Individual>,
    ) -> Self {
        Self::ClassAssertion {
            class: class.into(),
            individual: individual.into(),
        }
    }

    /// Creates an EquivalentClasses axiom.
    pub fn equivalent_classes(classes: Vec<ClassExpression>) -> Self {
        Self::EquivalentClasses(classes)
    }

    /// Creates a DisjointClasses axiom.
    pub fn disjoint_classes(classes: Vec<ClassExpression>) -> Self {
        Self::DisjointClasses(classes)
    }

    /// Creates an `rdfs:label` annotation assertion.
    pub fn label(subject: impl Into<NamedNode>, value: impl Into<Literal>) -> Self {
        Self::AnnotationAssertion {
            property: AnnotationProperty::new(oxrdf::vocab::rdfs::LABEL.into_owned()),
            subject: subject.into(),
            value: value.into(),
        }
    }

    /// Visits the class expressions this axiom is made of.
    pub fn for_each_class_expression<'a>(&'a self, mut f: impl FnMut(&'a ClassExpression)) {
        match self {
            Self::SubClassOf {
                sub_class,
                super_class,
            } => {
                f(sub_class);
                f(super_class);
            }
            Self::EquivalentClasses(classes) | Self::DisjointClasses(classes) => {
                classes.iter().for_each(f);
            }
            Self::ClassAssertion { class, .. } => f(class),
            Self::AnnotationAssertion { .. }
            | Self::DeclareClass(_)
            | Self::DeclareObjectProperty(_)
            | Self::DeclareNamedIndividual(_) => (),
        }
    }
}
