use logos::Logos;

/// Tokens of a single CLS record, e.g. `GOTO/10.0,20.0,-5.0`

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r\n]+")] // Skip whitespace
#[logos(error = LexerError)]
pub enum Token {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_ascii_uppercase())]
    Word(String),

    #[regex(r"[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("/")]
    Slash,

    #[token(",")]
    Comma,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexerError;

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lexer error")
    }
}

impl std::error::Error for LexerError {}

/// Lex a record, stopping at the first unrecognised character.
/// The error carries the byte offset of the offending input.
pub fn lex(input: &str) -> Result<Vec<(Token, logos::Span)>, usize> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(_) => Err(span.start),
        })
        .collect()
}
