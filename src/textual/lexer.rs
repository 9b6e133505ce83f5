use logos::{Lexer, Logos};

#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    #[token(".")]
    Period,

    #[token(",")]
    Comma,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(":-")]
    ImpliedBy,

    #[token("!")]
    Cut,

    /// An atom or functor name.
    #[regex("[a-z][a-zA-Z_0-9]*")]
    Symbol,

    /// A number literal; stored as an atom, the engine knows no arithmetic.
    #[regex("[0-9]+")]
    Number,

    /// A quoted string literal, also stored as an atom.
    #[regex(r#""[^"]*""#)]
    Str,

    /// A named variable like `$X` or `$Who`.
    #[regex(r"\$[a-zA-Z_0-9]+", lex_variable)]
    Variable(String),

    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    #[regex(r"[ \t\n\f\r]+", logos::skip)]
    Whitespace,

    #[error]
    Error,
}

fn lex_variable(lex: &mut Lexer<Token>) -> String {
    // skip '$'
    lex.slice()[1..].to_string()
}
