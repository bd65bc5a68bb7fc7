//! OWL semantics that no single axiom translation captures: interplay
//! between schema statements, and the equality consequences of functional
//! properties and disjointness.

use mimizuku_rules::{parse_n3, Ruleset};

use crate::DlpError;

pub const NON_HORN_SEMANTICS: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .

# subsumption
{ ?a rdfs:subClassOf ?b . ?b rdfs:subClassOf ?c } => { ?a rdfs:subClassOf ?c } .
{ ?a owl:equivalentClass ?b } => { ?a rdfs:subClassOf ?b . ?b rdfs:subClassOf ?a } .
{ ?a rdfs:subClassOf ?b . ?b rdfs:subClassOf ?a } => { ?a owl:equivalentClass ?b } .
{ ?p rdfs:subPropertyOf ?q . ?q rdfs:subPropertyOf ?r } => { ?p rdfs:subPropertyOf ?r } .
{ ?p owl:equivalentProperty ?q } => { ?p rdfs:subPropertyOf ?q . ?q rdfs:subPropertyOf ?p } .

# inverses
{ ?p owl:inverseOf ?q } => { ?q owl:inverseOf ?p } .
{ ?p owl:inverseOf ?q . ?p a owl:FunctionalProperty } => { ?q a owl:InverseFunctionalProperty } .
{ ?p owl:inverseOf ?q . ?p a owl:InverseFunctionalProperty } => { ?q a owl:FunctionalProperty } .
{ ?p owl:inverseOf ?q . ?p a owl:SymmetricProperty } => { ?q a owl:SymmetricProperty } .

# equality
{ ?p a owl:FunctionalProperty . ?x ?p ?a . ?x ?p ?b } => { ?a owl:sameAs ?b } .
{ ?p a owl:InverseFunctionalProperty . ?a ?p ?y . ?b ?p ?y } => { ?a owl:sameAs ?b } .
{ ?a owl:sameAs ?b } => { ?b owl:sameAs ?a } .
{ ?a owl:sameAs ?b . ?b owl:sameAs ?c } => { ?a owl:sameAs ?c } .

# symmetric schema relations
{ ?a owl:differentFrom ?b } => { ?b owl:differentFrom ?a } .
{ ?a owl:disjointWith ?b } => { ?b owl:disjointWith ?a } .
{ ?a owl:complementOf ?b } => { ?b owl:complementOf ?a } .
{ ?c owl:disjointWith ?d . ?a a ?c . ?b a ?d } => { ?a owl:differentFrom ?b } .
"#;

/// The fixed supplement as parsed rules
pub fn non_horn_semantics() -> Result<Ruleset, DlpError> {
    Ok(parse_n3(NON_HORN_SEMANTICS)?)
}
