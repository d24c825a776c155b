//! Class hierarchy reasoning.
//!
//! [`Reasoner`] is the classification interface the rest of the toolkit
//! consumes. [`StructuralReasoner`] implements it over the told axioms of an
//! ontology: named subsumptions, equivalences and disjointness, closed
//! transitively.

use crate::axiom::Axiom;
use crate::entity::{Individual, OwlClass};
use crate::error::{OwlError, ReasoningError};
use crate::expression::ClassExpression;
use crate::ontology::Ontology;
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuration for the reasoner.
#[derive(Debug, Clone, Default)]
pub struct ReasonerConfig {
    /// Maximum time allowed for classification (None = unlimited).
    pub timeout: Option<Duration>,
}

/// A set of classes the reasoner proved equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    members: Vec<OwlClass>,
    top: bool,
    bottom: bool,
}

impl ClassNode {
    fn new(members: impl IntoIterator<Item = OwlClass>, top: bool, bottom: bool) -> Self {
        let mut members = members.into_iter().collect::<Vec<_>>();
        members.sort_unstable();
        members.dedup();
        Self {
            members,
            top,
            bottom,
        }
    }

    /// The members of the group, sorted by IRI.
    pub fn members(&self) -> &[OwlClass] {
        &self.members
    }

    /// Is this the group of `owl:Thing`?
    pub fn is_top(&self) -> bool {
        self.top
    }

    /// Is this the group of `owl:Nothing`, i.e. of unsatisfiable classes?
    pub fn is_bottom(&self) -> bool {
        self.bottom
    }

    pub fn contains(&self, class: &OwlClass) -> bool {
        self.members.binary_search(class).is_ok()
    }
}

/// Trait for OWL classifiers.
pub trait Reasoner {
    /// Classifies the ontology (computes all subsumption relationships).
    ///
    /// Must be called once before any other method.
    fn classify(&mut self) -> Result<(), OwlError>;

    /// Checks if the ontology is consistent.
    fn is_consistent(&self) -> Result<bool, OwlError>;

    /// Checks if a class may have instances.
    fn is_satisfiable(&self, class: &OwlClass) -> Result<bool, OwlError>;

    /// Returns the groups of the direct superclasses of a class.
    ///
    /// A class without any named superclass gets the top group.
    fn direct_super_class_groups(&self, class: &OwlClass) -> Result<Vec<ClassNode>, OwlError>;

    /// Returns the group of classes equivalent to a class, itself included.
    fn equivalence_group(&self, class: &OwlClass) -> Result<ClassNode, OwlError>;

    /// Returns the super class expressions of the told `SubClassOf` axioms of a class.
    fn sub_class_axioms(&self, class: &OwlClass) -> Vec<&ClassExpression>;
}

/// Classifier working on the told class axioms of an ontology.
///
/// ```
/// use oxowl::{Axiom, Ontology, OwlClass, Reasoner, StructuralReasoner};
///
/// let pizza = OwlClass::new_from_iri("http://example.org/Pizza")?;
/// let food = OwlClass::new_from_iri("http://example.org/Food")?;
/// let mut ontology = Ontology::new(None);
/// ontology.add_axiom(Axiom::subclass_of(pizza.clone(), food.clone()));
///
/// let mut reasoner = StructuralReasoner::new(&ontology);
/// reasoner.classify()?;
/// let supers = reasoner.direct_super_class_groups(&pizza)?;
/// assert_eq!(supers[0].members(), [food]);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct StructuralReasoner<'a> {
    ontology: &'a Ontology,
    config: ReasonerConfig,
    classification: Option<Classification>,
}

#[derive(Debug)]
struct Classification {
    /// Reflexive and transitive told superclasses of every known class
    supers: FxHashMap<OwlClass, FxHashSet<OwlClass>>,
    unsatisfiable: FxHashSet<OwlClass>,
    top: FxHashSet<OwlClass>,
    consistent: bool,
}

impl<'a> StructuralReasoner<'a> {
    /// Creates a new reasoner for the given ontology.
    pub fn new(ontology: &'a Ontology) -> Self {
        Self::with_config(ontology, ReasonerConfig::default())
    }

    /// Creates a new reasoner with custom configuration.
    pub fn with_config(ontology: &'a Ontology, config: ReasonerConfig) -> Self {
        Self {
            ontology,
            config,
            classification: None,
        }
    }

    fn classification(&self) -> Result<&Classification, OwlError> {
        Ok(self
            .classification
            .as_ref()
            .ok_or(ReasoningError::NotClassified)?)
    }

    fn check_timeout(&self, start: Instant) -> Result<(), OwlError> {
        if let Some(timeout) = self.config.timeout {
            if start.elapsed() >= timeout {
                return Err(ReasoningError::Timeout(timeout).into());
            }
        }
        Ok(())
    }
}

impl Reasoner for StructuralReasoner<'_> {
    fn classify(&mut self) -> Result<(), OwlError> {
        let start = Instant::now();
        let mut told: FxHashMap<OwlClass, FxHashSet<OwlClass>> = FxHashMap::default();
        let mut disjoint: FxHashMap<OwlClass, FxHashSet<OwlClass>> = FxHashMap::default();
        let mut assertions = Vec::new();
        for class in self.ontology.classes() {
            told.entry(class.clone()).or_default();
        }
        told.entry(OwlClass::thing()).or_default();
        told.entry(OwlClass::nothing()).or_default();

        for axiom in self.ontology.axioms() {
            match axiom {
                Axiom::SubClassOf {
                    sub_class: ClassExpression::Class(sub),
                    super_class,
                } => {
                    for sup in super_class.named_conjuncts() {
                        told.entry(sub.clone()).or_default().insert(sup.clone());
                    }
                }
                Axiom::EquivalentClasses(operands) => {
                    let named = operands
                        .iter()
                        .filter_map(ClassExpression::as_class)
                        .collect::<Vec<_>>();
                    for left in &named {
                        let entry = told.entry((*left).clone()).or_default();
                        for right in &named {
                            entry.insert((*right).clone());
                        }
                        for operand in operands.iter().filter(|o| !o.is_named()) {
                            entry.extend(operand.named_conjuncts().into_iter().cloned());
                        }
                    }
                }
                Axiom::DisjointClasses(operands) => {
                    let named = operands
                        .iter()
                        .filter_map(ClassExpression::as_class)
                        .collect::<Vec<_>>();
                    for (i, left) in named.iter().enumerate() {
                        for right in &named[i + 1..] {
                            disjoint
                                .entry((*left).clone())
                                .or_default()
                                .insert((*right).clone());
                            disjoint
                                .entry((*right).clone())
                                .or_default()
                                .insert((*left).clone());
                        }
                    }
                }
                Axiom::ClassAssertion {
                    class: ClassExpression::Class(class),
                    individual: individual @ Individual::Named(_),
                } => assertions.push((class.clone(), individual.clone())),
                _ => (),
            }
        }

        let mut supers = FxHashMap::default();
        for class in told.keys() {
            self.check_timeout(start)?;
            let mut reached = FxHashSet::default();
            let mut stack = vec![class];
            while let Some(current) = stack.pop() {
                if reached.insert(current.clone()) {
                    if let Some(next) = told.get(current) {
                        stack.extend(next.iter());
                    }
                }
            }
            supers.insert(class.clone(), reached);
        }

        let nothing = OwlClass::nothing();
        let mut unsatisfiable = FxHashSet::default();
        for (class, reached) in &supers {
            let clash = reached.contains(&nothing)
                || reached.iter().any(|s| {
                    disjoint
                        .get(s)
                        .is_some_and(|d| d.iter().any(|o| reached.contains(o)))
                });
            if clash {
                unsatisfiable.insert(class.clone());
            }
        }

        let thing = OwlClass::thing();
        let top = supers.get(&thing).cloned().unwrap_or_default();
        let mut consistent = !unsatisfiable.contains(&thing);
        for (class, individual) in assertions {
            if unsatisfiable.contains(&class) {
                debug!("{individual} is an instance of the unsatisfiable class {class}");
                consistent = false;
            }
        }
        debug!(
            classes = supers.len(),
            unsatisfiable = unsatisfiable.len(),
            elapsed = ?start.elapsed(),
            "Classification done"
        );
        self.classification = Some(Classification {
            supers,
            unsatisfiable,
            top,
            consistent,
        });
        Ok(())
    }

    fn is_consistent(&self) -> Result<bool, OwlError> {
        Ok(self.classification()?.consistent)
    }

    fn is_satisfiable(&self, class: &OwlClass) -> Result<bool, OwlError> {
        Ok(!class.is_nothing() && !self.classification()?.unsatisfiable.contains(class))
    }

    fn direct_super_class_groups(&self, class: &OwlClass) -> Result<Vec<ClassNode>, OwlError> {
        let classification = self.classification()?;
        if classification.top.contains(class) {
            return Ok(Vec::new());
        }
        let Some(reached) = classification.supers.get(class) else {
            return Ok(vec![classification.top_node()]);
        };
        let candidates = reached
            .iter()
            .filter(|s| {
                !classification.top.contains(*s)
                    && !classification.unsatisfiable.contains(*s)
                    && !classification.are_equivalent(class, s)
            })
            .collect::<Vec<_>>();
        let mut direct = candidates
            .iter()
            .filter(|s| {
                !candidates.iter().any(|t| {
                    !classification.are_equivalent(s, t)
                        && classification.is_sub_class_of(t, s)
                })
            })
            .copied()
            .collect::<Vec<_>>();
        direct.sort_unstable();

        let mut groups: Vec<ClassNode> = Vec::new();
        for sup in direct {
            if groups.iter().any(|g| g.contains(sup)) {
                continue;
            }
            groups.push(classification.node_of(sup));
        }
        if groups.is_empty() {
            groups.push(classification.top_node());
        }
        Ok(groups)
    }

    fn equivalence_group(&self, class: &OwlClass) -> Result<ClassNode, OwlError> {
        Ok(self.classification()?.node_of(class))
    }

    fn sub_class_axioms(&self, class: &OwlClass) -> Vec<&ClassExpression> {
        self.ontology.sub_class_axioms_for(class).collect()
    }
}

impl Classification {
    fn is_sub_class_of(&self, sub: &OwlClass, sup: &OwlClass) -> bool {
        self.supers.get(sub).is_some_and(|s| s.contains(sup))
    }

    fn are_equivalent(&self, a: &OwlClass, b: &OwlClass) -> bool {
        a == b || (self.is_sub_class_of(a, b) && self.is_sub_class_of(b, a))
    }

    fn top_node(&self) -> ClassNode {
        ClassNode::new(
            self.top.iter().cloned().chain([OwlClass::thing()]),
            true,
            false,
        )
    }

    fn bottom_node(&self) -> ClassNode {
        ClassNode::new(
            self.unsatisfiable
                .iter()
                .cloned()
                .chain([OwlClass::nothing()]),
            false,
            true,
        )
    }

    fn node_of(&self, class: &OwlClass) -> ClassNode {
        if class.is_nothing() || self.unsatisfiable.contains(class) {
            return self.bottom_node();
        }
        if class.is_thing() || self.top.contains(class) {
            return self.top_node();
        }
        let Some(reached) = self.supers.get(class) else {
            return ClassNode::new([class.clone()], false, false);
        };
        ClassNode::new(
            reached
                .iter()
                .filter(|s| self.is_sub_class_of(s, class))
                .cloned(),
            false,
            false,
        )
    }
}
