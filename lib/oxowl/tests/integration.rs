use oxowl::{ClassExpression, ObjectProperty, OntologyParser, OwlClass, Reasoner, StructuralReasoner};
use oxrdf::NamedNode;
use oxrdfio::RdfFormat;
use std::error::Error;

const PIZZA: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix : <http://example.org/pizza#> .

<http://example.org/pizza> a owl:Ontology ;
    rdfs:label "Pizza ontology"@en .

:hasTopping a owl:ObjectProperty .
:Food a owl:Class .
:Pizza a owl:Class ; rdfs:subClassOf :Food ; rdfs:label "Pizza"@en .
:Topping a owl:Class ; rdfs:subClassOf :Food .
:Mozzarella a owl:Class ; rdfs:subClassOf :Topping .
:Ham a owl:Class ; rdfs:subClassOf :Topping .
:Margherita a owl:Class ;
    rdfs:subClassOf :Pizza ,
        [ a owl:Restriction ; owl:onProperty :hasTopping ; owl:someValuesFrom :Mozzarella ] .
:CheesyPizza a owl:Class ;
    owl:equivalentClass [ owl:intersectionOf ( :Pizza
        [ a owl:Restriction ; owl:onProperty :hasTopping ; owl:someValuesFrom :Mozzarella ] ) ] .
:Vegetarian a owl:Class ; owl:disjointWith :Meat .
:Meat a owl:Class .
:HamAndPineapple a owl:Class ; rdfs:subClassOf :Vegetarian , :Meat .
"#;

fn class(name: &str) -> OwlClass {
    OwlClass::new(NamedNode::new_unchecked(format!(
        "http://example.org/pizza#{name}"
    )))
}

#[test]
fn parse_and_classify_pizza() -> Result<(), Box<dyn Error>> {
    let ontology = OntologyParser::parse_reader(RdfFormat::Turtle, PIZZA.as_bytes(), None)?;
    assert_eq!(
        ontology.iri().map(NamedNode::as_str),
        Some("http://example.org/pizza")
    );
    assert!(ontology.contains_class(&class("Mozzarella")));

    let mut reasoner = StructuralReasoner::new(&ontology);
    reasoner.classify()?;
    assert!(reasoner.is_consistent()?);

    let groups = reasoner.direct_super_class_groups(&class("Margherita"))?;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members(), [class("Pizza")]);

    let groups = reasoner.direct_super_class_groups(&class("CheesyPizza"))?;
    assert_eq!(groups[0].members(), [class("Pizza")]);

    let groups = reasoner.direct_super_class_groups(&class("Food"))?;
    assert!(groups[0].is_top());

    assert!(!reasoner.is_satisfiable(&class("HamAndPineapple"))?);
    assert!(reasoner.is_satisfiable(&class("Vegetarian"))?);

    let restriction = ClassExpression::some_values_from(
        ObjectProperty::new(NamedNode::new_unchecked("http://example.org/pizza#hasTopping")),
        class("Mozzarella").into(),
    );
    assert!(
        reasoner
            .sub_class_axioms(&class("Margherita"))
            .contains(&&restriction)
    );
    Ok(())
}

#[test]
fn rdf_xml_document() -> Result<(), Box<dyn Error>> {
    let data = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xml:base="http://purl.obolibrary.org/obo/go.owl">
  <owl:Ontology rdf:about="http://purl.obolibrary.org/obo/go.owl">
    <owl:versionIRI rdf:resource="http://purl.obolibrary.org/obo/go/releases/2016-01-01/go.owl"/>
  </owl:Ontology>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/GO_0008150">
    <rdfs:label xml:lang="en">biological_process</rdfs:label>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/GO_0009987">
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/GO_0008150"/>
  </owl:Class>
</rdf:RDF>"#;
    let ontology = OntologyParser::parse_reader(RdfFormat::RdfXml, data.as_bytes(), None)?;
    assert_eq!(
        ontology.version_iri().map(NamedNode::as_str),
        Some("http://purl.obolibrary.org/obo/go/releases/2016-01-01/go.owl")
    );
    let process = NamedNode::new("http://purl.obolibrary.org/obo/GO_0008150")?;
    let label = ontology.label_of(&process);
    assert_eq!(label.map(|l| l.value()), Some("biological_process"));
    assert_eq!(label.and_then(|l| l.language()), Some("en"));
    assert_eq!(ontology.classes().count(), 2);
    Ok(())
}

#[test]
fn invalid_document() {
    assert!(OntologyParser::parse_reader(RdfFormat::Turtle, "<a> <b> .".as_bytes(), None).is_err());
}
