//! Recursive-descent parser for the rule subset of Notation3

use std::collections::BTreeMap;
use std::ops::Range;

use logos::Logos;
use mimizuku_core::vocabulary::{owl, rdf, swap, xsd};
use mimizuku_core::{Literal, Term, Triple};
use tracing::debug;

use super::lexer::Token;
use crate::clause::{HornRule, Ruleset};
use crate::RuleError;

/// Parse an N3 rule document
pub fn parse_n3(input: &str) -> Result<Ruleset, RuleError> {
    N3Parser::new(input)?.parse()
}

/// N3 document parser.
///
/// Supports `@prefix`/`@base`, facts, `{ body } => { head }` (and `<=`,
/// `log:implies`), `a`, `=`, `;`/`,` abbreviations, `[]` blank nodes and
/// plain, language-tagged, typed, numeric and boolean literals.
pub struct N3Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token<'a>, Range<usize>)>,
    pos: usize,
    prefixes: BTreeMap<String, String>,
    base: Option<String>,
    blank_counter: usize,
}

impl<'a> N3Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, RuleError> {
        let mut tokens = Vec::new();
        let mut lexer = Token::lexer(source);
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    let (line, column) = line_column(source, span.start);
                    return Err(RuleError::Parse {
                        line,
                        column,
                        message: format!("unrecognised input '{}'", &source[span]),
                    });
                }
            }
        }

        Ok(Self { source, tokens, pos: 0, prefixes: BTreeMap::new(), base: None, blank_counter: 0 })
    }

    /// Pre-declare prefixes, e.g. the well-known vocabulary ones
    pub fn with_prefixes<I, K, V>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn parse(mut self) -> Result<Ruleset, RuleError> {
        let mut ruleset = Ruleset::new();
        while self.peek().is_some() {
            self.statement(&mut ruleset)?;
        }
        ruleset.prefixes = self.prefixes;
        debug!(rules = ruleset.rules.len(), facts = ruleset.facts.len(), "parsed N3 document");
        Ok(ruleset)
    }

    fn statement(&mut self, out: &mut Ruleset) -> Result<(), RuleError> {
        match self.peek() {
            Some(Token::Prefix) => {
                self.advance();
                let name = match self.advance() {
                    Some(Token::PrefixedName(name)) if name.ends_with(':') => name.trim_end_matches(':').to_string(),
                    other => return Err(self.unexpected(other, "prefix name")),
                };
                let iri = self.iri_ref()?;
                self.expect(Token::Dot)?;
                self.prefixes.insert(name, iri);
                Ok(())
            }
            Some(Token::Base) => {
                self.advance();
                let iri = self.iri_ref()?;
                self.expect(Token::Dot)?;
                self.base = Some(iri);
                Ok(())
            }
            Some(Token::LBrace) => {
                let (line, column) = self.position();
                let first = self.formula()?;
                let reversed = match self.peek() {
                    Some(Token::Implies) => {
                        self.advance();
                        false
                    }
                    Some(Token::ImpliedBy) => {
                        self.advance();
                        true
                    }
                    _ => {
                        let verb = self.term()?;
                        if verb != Term::iri(swap::LOG_IMPLIES) {
                            return Err(self.error_here(format!("expected '=>' between formulas, found {}", verb)));
                        }
                        false
                    }
                };
                let second = self.formula()?;
                self.expect(Token::Dot)?;

                let (body, head) = if reversed { (second, first) } else { (first, second) };
                out.rules.push(HornRule::new(format!("n3:{}:{}", line, column), body, head));
                Ok(())
            }
            Some(_) => {
                let mut facts = Vec::new();
                self.triples(&mut facts)?;
                self.expect(Token::Dot)?;
                if let Some(fact) = facts.iter().find(|t| t.has_variables()) {
                    return Err(self.error_here(format!("variable outside a formula in {}", fact)));
                }
                out.facts.extend(facts);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// `{ triples }`
    fn formula(&mut self) -> Result<Vec<Triple>, RuleError> {
        self.expect(Token::LBrace)?;
        let mut triples = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    return Ok(triples);
                }
                Some(Token::Dot) => {
                    self.advance();
                }
                Some(_) => {
                    self.triples(&mut triples)?;
                    match self.peek() {
                        Some(Token::Dot) | Some(Token::RBrace) => {}
                        other => return Err(self.unexpected(other.copied(), "'.' or '}'")),
                    }
                }
                None => return Err(self.error_here("unterminated formula".to_string())),
            }
        }
    }

    fn triples(&mut self, sink: &mut Vec<Triple>) -> Result<(), RuleError> {
        if self.peek() == Some(&Token::LBracket) {
            let subject = self.blank_property_list(sink)?;
            if matches!(self.peek(), Some(Token::Dot) | Some(Token::RBrace)) {
                return Ok(());
            }
            return self.predicate_object_list(&subject, sink);
        }
        let subject = self.term()?;
        self.predicate_object_list(&subject, sink)
    }

    fn predicate_object_list(&mut self, subject: &Term, sink: &mut Vec<Triple>) -> Result<(), RuleError> {
        loop {
            let verb = self.verb()?;
            self.object_list(subject, &verb, sink)?;

            if self.peek() != Some(&Token::Semicolon) {
                return Ok(());
            }
            while self.peek() == Some(&Token::Semicolon) {
                self.advance();
            }
            if matches!(self.peek(), None | Some(Token::Dot) | Some(Token::RBrace) | Some(Token::RBracket)) {
                return Ok(());
            }
        }
    }

    fn object_list(&mut self, subject: &Term, verb: &Term, sink: &mut Vec<Triple>) -> Result<(), RuleError> {
        loop {
            let object = if self.peek() == Some(&Token::LBracket) {
                self.blank_property_list(sink)?
            } else {
                self.term()?
            };
            sink.push(Triple::new(subject.clone(), verb.clone(), object));

            if self.peek() == Some(&Token::Comma) {
                self.advance();
            } else {
                return Ok(());
            }
        }
    }

    fn verb(&mut self) -> Result<Term, RuleError> {
        match self.peek() {
            Some(Token::A) => {
                self.advance();
                Ok(Term::iri(rdf::TYPE))
            }
            Some(Token::SameAs) => {
                self.advance();
                Ok(Term::iri(owl::SAME_AS))
            }
            Some(Token::Implies) => {
                self.advance();
                Ok(Term::iri(swap::LOG_IMPLIES))
            }
            _ => self.term(),
        }
    }

    /// `[ predicateObjectList? ]`, returning the fresh blank node
    fn blank_property_list(&mut self, sink: &mut Vec<Triple>) -> Result<Term, RuleError> {
        self.expect(Token::LBracket)?;
        let node = self.fresh_blank();
        if self.peek() == Some(&Token::RBracket) {
            self.advance();
            return Ok(node);
        }
        self.predicate_object_list(&node, sink)?;
        self.expect(Token::RBracket)?;
        Ok(node)
    }

    fn term(&mut self) -> Result<Term, RuleError> {
        match self.advance() {
            Some(Token::IriRef(raw)) => Ok(Term::iri(self.resolve_iri(&raw[1..raw.len() - 1]))),
            Some(Token::PrefixedName(name)) => self.expand(name).map(Term::iri),
            Some(Token::Variable(name)) => Ok(Term::var(&name[1..])),
            Some(Token::BlankLabel(label)) => Ok(Term::blank(&label[2..])),
            Some(Token::String(raw)) => self.literal(raw),
            Some(Token::Integer(s)) => Ok(Term::typed_literal(s, xsd::INTEGER)),
            Some(Token::Decimal(s)) => Ok(Term::typed_literal(s, xsd::DECIMAL)),
            Some(Token::Double(s)) => Ok(Term::typed_literal(s, xsd::DOUBLE)),
            Some(Token::True) => Ok(Term::typed_literal("true", xsd::BOOLEAN)),
            Some(Token::False) => Ok(Term::typed_literal("false", xsd::BOOLEAN)),
            other => Err(self.unexpected(other, "term")),
        }
    }

    fn literal(&mut self, raw: &str) -> Result<Term, RuleError> {
        let lexical = unescape(&raw[1..raw.len() - 1]);
        match self.peek() {
            Some(Token::LangTag(tag)) => {
                let tag = tag[1..].to_string();
                self.advance();
                Ok(Term::Literal(Literal::lang(lexical, tag)))
            }
            Some(Token::DoubleCaret) => {
                self.advance();
                match self.term()? {
                    Term::Iri(datatype) => Ok(Term::Literal(Literal::typed(lexical, datatype))),
                    other => Err(self.error_here(format!("datatype must be an IRI, found {}", other))),
                }
            }
            _ => Ok(Term::Literal(Literal::plain(lexical))),
        }
    }

    fn iri_ref(&mut self) -> Result<String, RuleError> {
        match self.advance() {
            Some(Token::IriRef(raw)) => Ok(self.resolve_iri(&raw[1..raw.len() - 1])),
            other => Err(self.unexpected(other, "IRI")),
        }
    }

    fn resolve_iri(&self, iri: &str) -> String {
        match &self.base {
            Some(base) if !iri.contains(':') => format!("{}{}", base, iri),
            _ => iri.to_string(),
        }
    }

    fn expand(&self, name: &str) -> Result<String, RuleError> {
        let (prefix, local) = name.split_once(':').unwrap_or(("", name));
        match self.prefixes.get(prefix) {
            Some(ns) => Ok(format!("{}{}", ns, local)),
            None => Err(self.error_at(self.pos.saturating_sub(1), format!("undeclared prefix '{}:'", prefix))),
        }
    }

    fn fresh_blank(&mut self) -> Term {
        self.blank_counter += 1;
        Term::blank(format!("gen{}", self.blank_counter))
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| *t);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token<'static>) -> Result<(), RuleError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            other => Err(self.unexpected(other, &expected.describe())),
        }
    }

    fn position(&self) -> (usize, usize) {
        let offset = self.tokens.get(self.pos).map_or(self.source.len(), |(_, span)| span.start);
        line_column(self.source, offset)
    }

    fn error_here(&self, message: String) -> RuleError {
        let (line, column) = self.position();
        RuleError::Parse { line, column, message }
    }

    fn error_at(&self, index: usize, message: String) -> RuleError {
        let offset = self.tokens.get(index).map_or(self.source.len(), |(_, span)| span.start);
        let (line, column) = line_column(self.source, offset);
        RuleError::Parse { line, column, message }
    }

    /// Error for the token just consumed (or end of input)
    fn unexpected(&self, found: Option<Token<'a>>, expected: &str) -> RuleError {
        match found {
            Some(token) => self.error_at(
                self.pos.saturating_sub(1),
                format!("expected {}, found {}", expected, token.describe()),
            ),
            None => self.error_here(format!("expected {}, found end of input", expected)),
        }
    }
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |i| before.len() - i - 1) + 1;
    (line, column)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
