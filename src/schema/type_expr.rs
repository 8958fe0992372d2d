//! Type expression grammar
//!
//! ```text
//! type     := list ["!"] | name ["!"]
//! list     := "[" type "]"
//! name     := [_A-Za-z][_0-9A-Za-z]*
//! ```
//!
//! Whitespace is allowed between tokens. A bang may follow a name or a
//! closing bracket at most once.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Parsed wrapper structure around a bare type name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
    NonNull(Box<TypeExpr>),
}

/// Syntax error in a type expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("expected a type name at offset {offset}")]
    MissingName { offset: usize },

    #[error("list opened at offset {offset} is never closed")]
    UnclosedList { offset: usize },

    #[error("type is marked non-null twice at offset {offset}")]
    DoubleNonNull { offset: usize },
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    /// Parse a type expression such as `[User!]!`.
    pub fn parse(input: &str) -> Result<Self, TypeExprError> {
        let mut parser = Parser {
            chars: input.char_indices().collect(),
            pos: 0,
        };
        parser.skip_whitespace();
        if parser.peek().is_none() {
            return Err(TypeExprError::Empty);
        }
        let expr = parser.parse_type()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(expr),
            Some((offset, found)) => Err(TypeExprError::Unexpected { found, offset }),
        }
    }

    /// The bare name at the center of the wrappers.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.name(),
        }
    }

    /// Number of list wrappers on the path to the bare name.
    pub fn list_depth(&self) -> usize {
        match self {
            Self::Named(_) => 0,
            Self::List(inner) => 1 + inner.list_depth(),
            Self::NonNull(inner) => inner.list_depth(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::List(inner) => write!(f, "[{}]", inner),
            Self::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn offset(&self) -> usize {
        self.peek()
            .map(|(offset, _)| offset)
            .or_else(|| self.chars.last().map(|(offset, c)| offset + c.len_utf8()))
            .unwrap_or(0)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeExprError> {
        self.skip_whitespace();
        let inner = match self.peek() {
            Some((open, '[')) => {
                self.pos += 1;
                let element = self.parse_type()?;
                self.skip_whitespace();
                match self.peek() {
                    Some((_, ']')) => self.pos += 1,
                    Some((offset, found)) => {
                        return Err(TypeExprError::Unexpected { found, offset })
                    }
                    None => return Err(TypeExprError::UnclosedList { offset: open }),
                }
                element.list()
            }
            _ => TypeExpr::Named(self.parse_name()?),
        };

        self.skip_whitespace();
        if !matches!(self.peek(), Some((_, '!'))) {
            return Ok(inner);
        }
        self.pos += 1;
        self.skip_whitespace();
        if let Some((offset, '!')) = self.peek() {
            return Err(TypeExprError::DoubleNonNull { offset });
        }
        Ok(inner.non_null())
    }

    fn parse_name(&mut self) -> Result<String, TypeExprError> {
        let mut name = String::new();
        while let Some((_, c)) = self.peek() {
            let valid = if name.is_empty() {
                c == '_' || c.is_ascii_alphabetic()
            } else {
                c == '_' || c.is_ascii_alphanumeric()
            };
            if !valid {
                break;
            }
            name.push(c);
            self.pos += 1;
        }

        if name.is_empty() {
            return match self.peek() {
                Some((offset, found)) if found != ']' && found != '!' => {
                    Err(TypeExprError::Unexpected { found, offset })
                }
                _ => Err(TypeExprError::MissingName {
                    offset: self.offset(),
                }),
            };
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrappers() {
        assert_eq!(TypeExpr::parse("User").unwrap(), TypeExpr::named("User"));
        assert_eq!(
            TypeExpr::parse("User!").unwrap(),
            TypeExpr::named("User").non_null()
        );
        assert_eq!(
            TypeExpr::parse("[User!]!").unwrap(),
            TypeExpr::named("User").non_null().list().non_null()
        );
    }

    #[test]
    fn test_nested_lists_and_depth() {
        let expr = TypeExpr::parse("[[Int!]!]").unwrap();
        assert_eq!(expr.name(), "Int");
        assert_eq!(expr.list_depth(), 2);
        assert!(!expr.is_non_null());
        assert_eq!(expr.to_string(), "[[Int!]!]");
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let expr = TypeExpr::parse("  [ String ! ] ! ").unwrap();
        assert_eq!(expr.to_string(), "[String!]!");
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(TypeExpr::parse("   "), Err(TypeExprError::Empty));
        assert_eq!(
            TypeExpr::parse("[User"),
            Err(TypeExprError::UnclosedList { offset: 0 })
        );
        assert_eq!(
            TypeExpr::parse("User!!"),
            Err(TypeExprError::DoubleNonNull { offset: 5 })
        );
        assert_eq!(
            TypeExpr::parse("[]"),
            Err(TypeExprError::MissingName { offset: 1 })
        );
        assert_eq!(
            TypeExpr::parse("User]"),
            Err(TypeExprError::Unexpected {
                found: ']',
                offset: 4
            })
        );
        assert_eq!(
            TypeExpr::parse("1User"),
            Err(TypeExprError::Unexpected {
                found: '1',
                offset: 0
            })
        );
    }

    #[test]
    fn test_from_str() {
        let expr: TypeExpr = "[ID]".parse().unwrap();
        assert_eq!(expr, TypeExpr::named("ID").list());
    }
}
