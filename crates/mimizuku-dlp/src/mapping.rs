//! Th / Tb: class expressions to formulas
//!
//! `th` translates a class that is being concluded, `tb` one that is being
//! tested. Both bottom out at an `rdf:type` atom for named classes.

use mimizuku_core::Term;
use mimizuku_rules::Formula;

use crate::class_expr::ClassExpression;
use crate::context::CompilationContext;
use crate::DlpError;

/// Head-position translation of "`x` is a `class`"
pub fn th(ctx: &mut CompilationContext, class: &ClassExpression, x: &Term) -> Result<Formula, DlpError> {
    match class {
        ClassExpression::Named(c) => Ok(Formula::class_atom(x.clone(), c.clone())),
        ClassExpression::Thing => Ok(Formula::And(Vec::new())),
        ClassExpression::IntersectionOf(parts) => {
            let parts = parts.iter().map(|part| th(ctx, part, x)).collect::<Result<Vec<_>, _>>()?;
            Ok(Formula::and(parts))
        }
        // disjunctive heads are dropped during normalisation
        ClassExpression::UnionOf(parts) => {
            let parts = parts.iter().map(|part| th(ctx, part, x)).collect::<Result<Vec<_>, _>>()?;
            Ok(Formula::or(parts))
        }
        ClassExpression::AllValuesFrom { property, filler } => {
            let y = ctx.fresh_variable();
            let body = Formula::Atom(property.atom(x.clone(), y.clone()));
            let head = th(ctx, filler, &y)?;
            Ok(Formula::Implies { body: Box::new(body), head: Box::new(head) })
        }
        ClassExpression::HasValue { property, value } => Ok(Formula::Atom(property.atom(x.clone(), value.clone()))),
        ClassExpression::SomeValuesFrom { .. } => Err(DlpError::Unsupported(format!("{} in a head", class))),
        ClassExpression::Nothing
        | ClassExpression::ComplementOf(_)
        | ClassExpression::OneOf(_)
        | ClassExpression::Cardinality { .. } => Err(DlpError::Unsupported(class.to_string())),
    }
}

/// Body-position translation of "`x` is a `class`"
pub fn tb(ctx: &mut CompilationContext, class: &ClassExpression, x: &Term) -> Result<Formula, DlpError> {
    match class {
        ClassExpression::Named(c) => Ok(Formula::class_atom(x.clone(), c.clone())),
        ClassExpression::Thing => Ok(Formula::And(Vec::new())),
        ClassExpression::IntersectionOf(parts) => {
            let parts = parts.iter().map(|part| tb(ctx, part, x)).collect::<Result<Vec<_>, _>>()?;
            Ok(Formula::and(parts))
        }
        ClassExpression::UnionOf(parts) => {
            let parts = parts.iter().map(|part| tb(ctx, part, x)).collect::<Result<Vec<_>, _>>()?;
            Ok(Formula::or(parts))
        }
        ClassExpression::SomeValuesFrom { property, filler } => {
            let y = ctx.fresh_variable();
            let edge = Formula::Atom(property.atom(x.clone(), y.clone()));
            Ok(Formula::and(vec![edge, tb(ctx, filler, &y)?]))
        }
        ClassExpression::HasValue { property, value } => Ok(Formula::Atom(property.atom(x.clone(), value.clone()))),
        ClassExpression::AllValuesFrom { .. } => Err(DlpError::Unsupported(format!("{} in a body", class))),
        ClassExpression::Nothing
        | ClassExpression::ComplementOf(_)
        | ClassExpression::OneOf(_)
        | ClassExpression::Cardinality { .. } => Err(DlpError::Unsupported(class.to_string())),
    }
}
