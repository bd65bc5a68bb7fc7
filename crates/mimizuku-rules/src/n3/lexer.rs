//! N3 トークナイザ

use logos::Logos;

/// N3 rule-document tokens
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token<'a> {
    #[token("@prefix")]
    Prefix,

    #[token("@base")]
    Base,

    #[token("=>")]
    Implies,

    #[token("<=")]
    ImpliedBy,

    #[token("=")]
    SameAs,

    #[token("a")]
    A,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[regex(r"<[^<>\x00-\x20]*>")]
    IriRef(&'a str),

    #[regex(r"([A-Za-z][A-Za-z0-9_\-]*)?:([A-Za-z0-9_][A-Za-z0-9_\-]*)?")]
    PrefixedName(&'a str),

    #[regex(r"\?[A-Za-z_][A-Za-z0-9_]*")]
    Variable(&'a str),

    #[regex(r"_:[A-Za-z0-9_][A-Za-z0-9_\-]*")]
    BlankLabel(&'a str),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String(&'a str),

    #[regex(r"@[a-zA-Z]+(-[a-zA-Z0-9]+)*")]
    LangTag(&'a str),

    #[regex(r"[+-]?[0-9]+")]
    Integer(&'a str),

    #[regex(r"[+-]?[0-9]+\.[0-9]+")]
    Decimal(&'a str),

    #[regex(r"[+-]?[0-9]+(\.[0-9]+)?[eE][+-]?[0-9]+")]
    Double(&'a str),

    #[token("^^")]
    DoubleCaret,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,
}

impl<'a> Token<'a> {
    /// Short human-readable rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Prefix => "'@prefix'".to_string(),
            Token::Base => "'@base'".to_string(),
            Token::Implies => "'=>'".to_string(),
            Token::ImpliedBy => "'<='".to_string(),
            Token::SameAs => "'='".to_string(),
            Token::A => "'a'".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::IriRef(s)
            | Token::PrefixedName(s)
            | Token::Variable(s)
            | Token::BlankLabel(s)
            | Token::String(s)
            | Token::LangTag(s)
            | Token::Integer(s)
            | Token::Decimal(s)
            | Token::Double(s) => format!("'{}'", s),
            Token::DoubleCaret => "'^^'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
        }
    }
}
