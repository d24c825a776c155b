//! OWL 2 entity types (classes, properties, individuals).

use oxrdf::{BlankNode, IriParseError, NamedNode, NamedNodeRef};
use std::fmt;

const OWL_THING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
const OWL_NOTHING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Nothing");

/// An OWL class (owl:Class).
///
/// Classes are sets of individuals. Every class is a subclass of owl:Thing
/// and a superclass of owl:Nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwlClass(NamedNode);

impl OwlClass {
    /// Creates a new OWL class from a named node.
    #[inline]
    pub fn new(iri: NamedNode) -> Self {
        Self(iri)
    }

    /// Creates a new OWL class from an IRI string.
    #[inline]
    pub fn new_from_iri(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Ok(Self(NamedNode::new(iri)?))
    }

    /// The universal class `owl:Thing`.
    #[inline]
    pub fn thing() -> Self {
        Self(OWL_THING.into_owned())
    }

    /// The empty class `owl:Nothing`.
    #[inline]
    pub fn nothing() -> Self {
        Self(OWL_NOTHING.into_owned())
    }

    #[inline]
    pub fn is_thing(&self) -> bool {
        self.0.as_ref() == OWL_THING
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        self.0.as_ref() == OWL_NOTHING
    }

    /// Returns the IRI of this class.
    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }

    /// Returns the IRI of this class as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Converts this class into its underlying named node.
    #[inline]
    pub fn into_inner(self) -> NamedNode {
        self.0
    }
}

impl fmt::Display for OwlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for OwlClass {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNodeRef<'_>> for OwlClass {
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self(node.into_owned())
    }
}

impl From<OwlClass> for NamedNode {
    fn from(class: OwlClass) -> Self {
        class.0
    }
}

/// An OWL object property (owl:ObjectProperty).
///
/// Object properties relate individuals to individuals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectProperty(NamedNode);

impl ObjectProperty {
    /// Creates a new object property from a named node.
    #[inline]
    pub fn new(iri: NamedNode) -> Self {
        Self(iri)
    }

    /// Creates a new object property from an IRI string.
    #[inline]
    pub fn new_from_iri(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Ok(Self(NamedNode::new(iri)?))
    }

    /// Returns the IRI of this property.
    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for ObjectProperty {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

impl From<ObjectProperty> for NamedNode {
    fn from(property: ObjectProperty) -> Self {
        property.0
    }
}

/// An OWL annotation property (owl:AnnotationProperty), e.g. `rdfs:label`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationProperty(NamedNode);

impl AnnotationProperty {
    #[inline]
    pub fn new(iri: NamedNode) -> Self {
        Self(iri)
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for AnnotationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for AnnotationProperty {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

/// An OWL individual, either named or anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Individual {
    /// A named individual identified by an IRI.
    Named(NamedNode),
    /// An anonymous individual identified by a blank node.
    Anonymous(BlankNode),
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::Anonymous(b) => write!(f, "{b}"),
        }
    }
}

impl From<NamedNode> for Individual {
    fn from(node: NamedNode) -> Self {
        Self::Named(node)
    }
}

impl From<BlankNode> for Individual {
    fn from(node: BlankNode) -> Self {
        Self::Anonymous(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_and_bottom() {
        assert!(OwlClass::thing().is_thing());
        assert!(OwlClass::nothing().is_nothing());
        assert!(!OwlClass::thing().is_nothing());
        assert_eq!(
            OwlClass::thing().as_str(),
            "http://www.w3.org/2002/07/owl#Thing"
        );
    }

    #[test]
    fn class_from_iri() -> Result<(), IriParseError> {
        let class = OwlClass::new_from_iri("http://example.org/Pizza")?;
        assert_eq!(class.to_string(), "<http://example.org/Pizza>");
        assert!(OwlClass::new_from_iri("not an iri").is_err());
        Ok(())
    }
}
