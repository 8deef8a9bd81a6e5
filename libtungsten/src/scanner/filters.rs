//! Filter stages chained after the scanner.
//!
//! Each stage is a stateless token-stream transformer; [strip] composes them in the order the
//! parser expects: trivia elision, string escape substitution, statement-boundary remapping.

use super::types::*;

/// Drops whitespace and comment tokens.
pub fn elide_trivia(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|tok| {
            !matches!(
                tok.ty.class(),
                TokenClass::Whitespace | TokenClass::Comment
            )
        })
        .collect()
}

/// Substitutes escape sequences inside string tokens.
///
/// `\"`, `\\`, `\n`, and `\t` are rewritten; any other escaped character is kept verbatim
/// (permissive, like the scanner).
pub fn substitute_escapes(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|tok| match tok.ty {
            TokenType::Str(raw) => Token::new(TokenType::Str(unescape(&raw)), tok.span),
            _ => tok,
        })
        .collect()
}

/// Remaps `;` to the end-of-statement sentinel and guarantees a statement boundary before
/// [Eof](TokenType::Eof) when the stream contains any other token.
pub fn mark_statement_ends(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + 1);
    let mut last_was_boundary = true;
    for tok in tokens {
        match tok.ty.class() {
            TokenClass::Semi => {
                out.push(Token::new(TokenType::EndOfStatement, tok.span));
                last_was_boundary = true;
            }
            TokenClass::Eof => {
                if !last_was_boundary {
                    out.push(Token::new(TokenType::EndOfStatement, tok.span));
                }
                out.push(tok);
                last_was_boundary = true;
            }
            _ => {
                out.push(tok);
                last_was_boundary = false;
            }
        }
    }
    out
}

/// Prepares scanned tokens for the parser.
pub fn strip(tokens: Vec<Token>) -> Vec<Token> {
    mark_statement_ends(substitute_escapes(elide_trivia(tokens)))
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
            Some(c @ '"') | Some(c @ '\\') => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn classes(tokens: &[Token]) -> Vec<TokenClass> {
        tokens.iter().map(|t| t.ty.class()).collect()
    }

    #[test]
    fn strip_elides_trivia_and_marks_boundaries() {
        use TokenClass::*;
        let tokens = strip(scan("1 + 2 (* note *); 3"));
        assert_eq!(
            classes(&tokens),
            vec![Number, Plus, Number, EndOfStatement, Number, EndOfStatement, Eof]
        );
    }

    #[test]
    fn strip_appends_missing_final_boundary() {
        use TokenClass::*;
        let tokens = strip(scan("x = 5"));
        assert_eq!(
            classes(&tokens),
            vec![Ident, Equal, Number, EndOfStatement, Eof]
        );
    }

    #[test]
    fn strip_of_empty_input_is_just_eof() {
        let tokens = strip(scan("  "));
        assert_eq!(classes(&tokens), vec![TokenClass::Eof]);
    }

    #[test]
    fn no_double_boundary_for_trailing_semi() {
        use TokenClass::*;
        let tokens = strip(scan("1;"));
        assert_eq!(classes(&tokens), vec![Number, EndOfStatement, Eof]);
    }

    macro_rules! unescape_tests {
        ($($name:ident: $raw:expr, $cooked:expr)*) => {
        $(
            #[test]
            fn $name() {
                assert_eq!(unescape($raw), $cooked);
            }
        )*
        }
    }

    unescape_tests! {
        plain: "abc", "abc"
        quote: r#"a\"b"#, "a\"b"
        backslash: r"a\\b", "a\\b"
        newline: r"a\nb", "a\nb"
        unknown_escape_kept: r"a\qb", "a\\qb"
        trailing_backslash_kept: r"a\", "a\\"
    }
}
