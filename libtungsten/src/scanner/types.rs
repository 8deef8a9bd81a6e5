//! Definitions of types used in the libtungsten scanner.

use crate::common::Span;
use crate::utils::display_float;
use core::fmt;

// Declares `TokenType` and `TokenClass` together so the two can never drift apart. A token's
// class is the terminal symbol the grammar sees; its type additionally carries scanned content.
macro_rules! define_tokens {
    (
        data { $($(#[doc = $ddoc:expr])* $dvar:ident($dty:ty) => $dname:expr;)* }
        fixed { $($(#[doc = $fdoc:expr])* $fvar:ident => $fname:expr;)* }
    ) => {
        /// The type of a [Token].
        #[derive(PartialEq, Clone, Debug)]
        pub enum TokenType {
            $($(#[doc = $ddoc])* $dvar($dty),)*
            $($(#[doc = $fdoc])* $fvar,)*
        }

        /// The class of a token, shared by all tokens of the same shape.
        ///
        /// Classes are the terminal symbols of the grammar: the predict table and the parser
        /// dispatch on a token's class, never on its content.
        #[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Debug)]
        pub enum TokenClass {
            $($dvar,)*
            $($fvar,)*
        }

        impl TokenType {
            /// The [TokenClass] this token belongs to.
            pub fn class(&self) -> TokenClass {
                match self {
                    $(TokenType::$dvar(_) => TokenClass::$dvar,)*
                    $(TokenType::$fvar => TokenClass::$fvar,)*
                }
            }
        }

        impl fmt::Display for TokenClass {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $(TokenClass::$dvar => $dname,)*
                    $(TokenClass::$fvar => $fname,)*
                };
                f.write_str(name)
            }
        }
    };
}

define_tokens! {
    data {
        /// A scanned number in double precision.
        Number(f64) => "a number";
        /// An identifier (symbol name).
        Ident(String) => "an identifier";
        /// A string literal, without its enclosing quotes.
        Str(String) => "a string";
        /// A block comment `(* ... *)`, without its delimiters.
        Comment(String) => "a comment";
    }
    fixed {
        /// A run of whitespace.
        Whitespace => "whitespace";
        /// + symbol
        Plus => "+";
        /// - symbol
        Minus => "-";
        /// * symbol
        Times => "*";
        /// / symbol
        Div => "/";
        /// % symbol
        Mod => "%";
        /// ^ symbol
        Caret => "^";
        /// ! symbol
        Bang => "!";
        /// = symbol
        Equal => "=";
        /// := symbol
        ColonEqual => ":=";
        /// == symbol
        DoubleEqual => "==";
        /// === symbol
        TripleEqual => "===";
        /// != symbol
        BangEqual => "!=";
        /// < symbol
        Less => "<";
        /// <= symbol
        LessEqual => "<=";
        /// > symbol
        Greater => ">";
        /// >= symbol
        GreaterEqual => ">=";
        /// && symbol
        AndAnd => "&&";
        /// || symbol
        OrOr => "||";
        /// , symbol
        Comma => ",";
        /// ; symbol
        Semi => ";";
        /// ( symbol
        OpenParen => "(";
        /// ) symbol
        CloseParen => ")";
        /// { symbol
        OpenBrace => "{";
        /// } symbol
        CloseBrace => "}";
        /// [ symbol
        OpenBracket => "[";
        /// ] symbol
        CloseBracket => "]";
        /// _ pattern marker
        Under => "_";
        /// __ pattern marker
        DoubleUnder => "__";
        /// ___ pattern marker
        TripleUnder => "___";
        /// Statement boundary, remapped from `;` by the filter stage.
        EndOfStatement => "end of statement";
        /// End of file.
        Eof => "end of file";
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Number(n) => f.write_str(&display_float(*n)),
            TokenType::Ident(s) => f.write_str(s),
            TokenType::Str(s) => write!(f, "\"{}\"", s),
            TokenType::Comment(s) => write!(f, "(*{}*)", s),
            other => write!(f, "{}", other.class()),
        }
    }
}

/// Describes a token in a tungsten program.
#[derive(PartialEq, Clone, Debug)]
pub struct Token {
    /// The type of the token.
    pub ty: TokenType,
    /// The source span of the token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new<S: Into<Span>>(ty: TokenType, span: S) -> Self {
        Self {
            ty,
            span: span.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}

#[cfg(test)]
mod tests {
    mod format {
        use crate::scanner::types::*;

        macro_rules! format_tests {
            ($($name:ident: $ty:expr, $format_str:expr)*) => {
            $(
                #[test]
                fn $name() {
                    use TokenType::*;
                    let tok = Token::new($ty, (0..0));
                    assert_eq!(tok.to_string(), $format_str);
                }
            )*
            }
        }

        format_tests! {
            number: Number(1.3), "1.3"
            integral_number: Number(2.0), "2"
            ident: Ident("ab".into()), "ab"
            string: Str("hi".into()), "\"hi\""
            plus: Plus, "+"
            colon_equal: ColonEqual, ":="
            triple_equal: TripleEqual, "==="
            double_under: DoubleUnder, "__"
            eof: Eof, "end of file"
        }
    }
}
