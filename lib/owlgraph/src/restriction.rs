//! Existential restrictions turned into class to class relationships.

use oxowl::{ClassExpression, ObjectProperty, OwlClass};
use oxrdf::NamedNode;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// A `property some filler` restriction with a named filler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Restriction {
    pub property: ObjectProperty,
    pub filler: OwlClass,
}

/// Collects the existential restrictions on the allowed `properties` found in the
/// given super class expressions.
///
/// Intersections, unions, complements and the fillers of other existential
/// restrictions are looked into. Restrictions with an anonymous filler or an inverse property are
/// ignored.
pub fn extract_restrictions<'a>(
    super_classes: impl IntoIterator<Item = &'a ClassExpression>,
    properties: &FxHashSet<NamedNode>,
) -> BTreeSet<Restriction> {
    let mut restrictions = BTreeSet::new();
    if properties.is_empty() {
        return restrictions;
    }
    for expression in super_classes {
        collect(expression, properties, &mut restrictions);
    }
    restrictions
}

fn collect(
    expression: &ClassExpression,
    properties: &FxHashSet<NamedNode>,
    restrictions: &mut BTreeSet<Restriction>,
) {
    match expression {
        ClassExpression::ObjectIntersectionOf(operands)
        | ClassExpression::ObjectUnionOf(operands) => {
            for operand in operands {
                collect(operand, properties, restrictions);
            }
        }
        ClassExpression::ObjectComplementOf(operand) => collect(operand, properties, restrictions),
        ClassExpression::ObjectSomeValuesFrom { property, filler } => {
            if let (Some(property), ClassExpression::Class(filler)) =
                (property.as_named(), filler.as_ref())
            {
                if properties.contains(property.iri()) {
                    restrictions.insert(Restriction {
                        property: property.clone(),
                        filler: filler.clone(),
                    });
                }
            }
            collect(filler, properties, restrictions);
        }
        _ => (),
    }
}
