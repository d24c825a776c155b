//! OWL 2 class expressions and object property expressions.

use crate::entity::{Individual, ObjectProperty, OwlClass};
use oxrdf::NamedNode;

/// An OWL 2 class expression.
///
/// Class expressions describe sets of individuals through various constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    /// A named class (atomic class)
    Class(OwlClass),

    /// ObjectIntersectionOf(C1, ..., Cn) - intersection of classes
    ObjectIntersectionOf(Vec<ClassExpression>),

    /// ObjectUnionOf(C1, ..., Cn) - union of classes
    ObjectUnionOf(Vec<ClassExpression>),

    /// ObjectComplementOf(C) - complement of a class
    ObjectComplementOf(Box<ClassExpression>),

    /// ObjectOneOf(a1, ..., an) - enumeration of individuals
    ObjectOneOf(Vec<Individual>),

    /// ObjectSomeValuesFrom(P, C) - existential restriction
    ObjectSomeValuesFrom {
        property: ObjectPropertyExpression,
        filler: Box<ClassExpression>,
    },

    /// ObjectAllValuesFrom(P, C) - universal restriction
    ObjectAllValuesFrom {
        property: ObjectPropertyExpression,
        filler: Box<ClassExpression>,
    },

    /// ObjectHasValue(P, a) - has-value restriction
    ObjectHasValue {
        property: ObjectPropertyExpression,
        individual: Individual,
    },

    /// ObjectMinCardinality(n, P) or ObjectMinCardinality(n, P, C)
    ObjectMinCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },

    /// ObjectMaxCardinality(n, P) or ObjectMaxCardinality(n, P, C)
    ObjectMaxCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },

    /// ObjectExactCardinality(n, P) or ObjectExactCardinality(n, P, C)
    ObjectExactCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },

    /// Any restriction on a data property, kept opaque.
    DataRestriction(NamedNode),
}

impl ClassExpression {
    /// Creates a named class expression.
    pub fn class(c: impl Into<OwlClass>) -> Self {
        Self::Class(c.into())
    }

    /// Creates an intersection of classes.
    pub fn intersection(classes: Vec<ClassExpression>) -> Self {
        Self::ObjectIntersectionOf(classes)
    }

    /// Creates a union of classes.
    pub fn union(classes: Vec<ClassExpression>) -> Self {
        Self::ObjectUnionOf(classes)
    }

    /// Creates the complement of a class expression.
    pub fn complement(c: ClassExpression) -> Self {
        Self::ObjectComplementOf(Box::new(c))
    }

    /// Creates an existential restriction.
    pub fn some_values_from(
        property: impl Into<ObjectPropertyExpression>,
        filler: ClassExpression,
    ) -> Self {
        Self::ObjectSomeValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    /// Creates a universal restriction.
    pub fn all_values_from(
        property: impl Into<ObjectPropertyExpression>,
        filler: ClassExpression,
    ) -> Self {
        Self::ObjectAllValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    /// Returns true if this is a named class.
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// Returns the named class if this is one.
    pub fn as_class(&self) -> Option<&OwlClass> {
        match self {
            Self::Class(c) => Some(c),
            _ => None,
        }
    }

    /// The named classes this expression is a subclass of by construction:
    /// itself if named, its named conjuncts if it is an intersection.
    pub fn named_conjuncts(&self) -> Vec<&OwlClass> {
        match self {
            Self::Class(c) => vec![c],
            Self::ObjectIntersectionOf(operands) => {
                operands.iter().flat_map(Self::named_conjuncts).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Visits every named class mentioned anywhere in this expression.
    pub fn for_each_class<'a>(&'a self, f: &mut impl FnMut(&'a OwlClass)) {
        match self {
            Self::Class(c) => f(c),
            Self::ObjectIntersectionOf(operands) | Self::ObjectUnionOf(operands) => {
                for operand in operands {
                    operand.for_each_class(f);
                }
            }
            Self::ObjectComplementOf(operand)
            | Self::ObjectSomeValuesFrom {
                filler: operand, ..
            }
            | Self::ObjectAllValuesFrom {
                filler: operand, ..
            }
            | Self::ObjectMinCardinality {
                filler: Some(operand),
                ..
            }
            | Self::ObjectMaxCardinality {
                filler: Some(operand),
                ..
            }
            | Self::ObjectExactCardinality {
                filler: Some(operand),
                ..
            } => operand.for_each_class(f),
            Self::ObjectOneOf(_)
            | Self::ObjectHasValue { .. }
            | Self::ObjectMinCardinality { filler: None, .. }
            | Self::ObjectMaxCardinality { filler: None, .. }
            | Self::ObjectExactCardinality { filler: None, .. }
            | Self::DataRestriction(_) => (),
        }
    }
}

impl From<OwlClass> for ClassExpression {
    fn from(c: OwlClass) -> Self {
        Self::Class(c)
    }
}

/// An OWL 2 object property expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectPropertyExpression {
    /// A named object property
    ObjectProperty(ObjectProperty),

    /// ObjectInverseOf(P) - inverse of a property
    ObjectInverseOf(Box<ObjectProperty>),
}

impl ObjectPropertyExpression {
    /// Creates an inverse property expression.
    pub fn inverse(property: ObjectProperty) -> Self {
        Self::ObjectInverseOf(Box::new(property))
    }

    /// Returns true if this is a named property.
    pub fn is_named(&self) -> bool {
        matches!(self, Self::ObjectProperty(_))
    }

    /// Returns the named property, or `None` for an inverse.
    pub fn as_named(&self) -> Option<&ObjectProperty> {
        match self {
            Self::ObjectProperty(p) => Some(p),
            Self::ObjectInverseOf(_) => None,
        }
    }
}

impl From<ObjectProperty> for ObjectPropertyExpression {
    fn from(p: ObjectProperty) -> Self {
        Self::ObjectProperty(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> OwlClass {
        OwlClass::new(NamedNode::new_unchecked(format!("http://example.org/{name}")))
    }

    #[test]
    fn named_conjuncts_of_intersection() {
        let expression = ClassExpression::intersection(vec![
            class("A").into(),
            ClassExpression::some_values_from(
                ObjectProperty::new(NamedNode::new_unchecked("http://example.org/p")),
                class("B").into(),
            ),
            ClassExpression::intersection(vec![class("C").into()]),
        ]);
        assert_eq!(expression.named_conjuncts(), vec![&class("A"), &class("C")]);
    }

    #[test]
    fn every_mentioned_class_is_visited() {
        let expression = ClassExpression::union(vec![
            ClassExpression::complement(class("A").into()),
            ClassExpression::some_values_from(
                ObjectProperty::new(NamedNode::new_unchecked("http://example.org/p")),
                class("B").into(),
            ),
        ]);
        let mut seen = Vec::new();
        expression.for_each_class(&mut |c| seen.push(c.clone()));
        assert_eq!(seen, vec![class("A"), class("B")]);
    }
}
