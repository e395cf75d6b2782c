//! Pattern expressions.
//!
//! An expression is parsed once, when the table is built, into a
//! [`PatternKind`]. The mini-language:
//!
//! | Expression    | Kind                                              |
//! |---------------|---------------------------------------------------|
//! | `-v`, `*.rs`  | literal or glob                                   |
//! | `$0`          | token at that exact zero-based position           |
//! | `$?<glob>`    | optional, at most one occurrence                  |
//! | `$+<glob>`    | required, one or more occurrences                 |
//! | `$\|<glob>`   | member of an OR-group, one or more across the group |

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::TableError;

/// Marks a constraint expression (`$?`, `$+`, `$|`, `$<n>`).
pub const CONSTRAINT_SENTINEL: char = '$';

/// Marks a token as a flag rather than a value.
pub const FLAG_SENTINEL: char = '-';

/// Returns true when the token looks like a flag.
pub fn is_flag(token: &str) -> bool {
    token.starts_with(FLAG_SENTINEL)
}

/// Compiled shell-style wildcard.
///
/// `*` also crosses `/`, and backslash escapes the next character.
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    matcher: GlobMatcher,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(false)
            .backslash_escape(true)
            .build()?
            .compile_matcher();
        Ok(Self {
            source: pattern.to_string(),
            matcher,
        })
    }

    pub fn is_match(&self, token: &str) -> bool {
        self.matcher.is_match(token)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// What a pattern entry matches, and under which quantifier.
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Plain glob. Only matches flags when the glob itself starts with `-`.
    Literal(Glob),
    /// Matches whatever token sits at this index.
    Position(usize),
    /// `$?` - held back as a tentative candidate, committed at most once.
    Optional(Glob),
    /// `$+` - matches every occurrence.
    Required(Glob),
    /// `$|` - like `$+`, but the occurrence count is shared by its group.
    Alternative { glob: Glob, group: usize },
}

impl PatternKind {
    /// Parse an expression. Alternatives come back with group 0; the table
    /// builder assigns the real group id.
    pub fn parse(expression: &str) -> Result<Self, TableError> {
        if expression.is_empty() {
            return Err(TableError::EmptyExpression);
        }

        let Some(constraint) = expression.strip_prefix(CONSTRAINT_SENTINEL) else {
            return Ok(PatternKind::Literal(compile(expression, expression)?));
        };

        let mut chars = constraint.chars();
        let kind = match chars.next() {
            Some('?') => PatternKind::Optional(compile(expression, chars.as_str())?),
            Some('+') => PatternKind::Required(compile(expression, chars.as_str())?),
            Some('|') => PatternKind::Alternative {
                glob: compile(expression, chars.as_str())?,
                group: 0,
            },
            Some(c) if c.is_ascii_digit() => {
                let index = constraint
                    .parse::<usize>()
                    .map_err(|source| TableError::InvalidPosition {
                        expression: expression.to_string(),
                        source,
                    })?;
                PatternKind::Position(index)
            }
            _ => return Err(TableError::InvalidExpression(expression.to_string())),
        };
        Ok(kind)
    }

    /// The glob, for every kind except [`PatternKind::Position`].
    pub fn glob(&self) -> Option<&Glob> {
        match self {
            PatternKind::Literal(glob)
            | PatternKind::Optional(glob)
            | PatternKind::Required(glob)
            | PatternKind::Alternative { glob, .. } => Some(glob),
            PatternKind::Position(_) => None,
        }
    }

    /// Whether the token at `position` fits this pattern, ignoring
    /// occurrence counts.
    pub fn accepts(&self, token: &str, position: usize) -> bool {
        match self {
            PatternKind::Position(index) => *index == position,
            PatternKind::Literal(glob) => {
                (!is_flag(token) || is_flag(glob.as_str())) && glob.is_match(token)
            }
            PatternKind::Optional(glob)
            | PatternKind::Required(glob)
            | PatternKind::Alternative { glob, .. } => glob.is_match(token),
        }
    }

    pub fn is_constraint(&self) -> bool {
        !matches!(self, PatternKind::Literal(_))
    }

    /// OR-group id of an alternative.
    pub fn group(&self) -> Option<usize> {
        match self {
            PatternKind::Alternative { group, .. } => Some(*group),
            _ => None,
        }
    }

    pub(crate) fn set_group(&mut self, id: usize) {
        if let PatternKind::Alternative { group, .. } = self {
            *group = id;
        }
    }

    /// Short label used by `--explain` and debug logs.
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::Literal(_) => "literal",
            PatternKind::Position(_) => "position",
            PatternKind::Optional(_) => "optional",
            PatternKind::Required(_) => "required",
            PatternKind::Alternative { .. } => "alternative",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Literal(glob) => write!(f, "{}", glob.as_str()),
            PatternKind::Position(index) => write!(f, "{CONSTRAINT_SENTINEL}{index}"),
            PatternKind::Optional(glob) => write!(f, "{CONSTRAINT_SENTINEL}?{}", glob.as_str()),
            PatternKind::Required(glob) => write!(f, "{CONSTRAINT_SENTINEL}+{}", glob.as_str()),
            PatternKind::Alternative { glob, .. } => {
                write!(f, "{CONSTRAINT_SENTINEL}|{}", glob.as_str())
            }
        }
    }
}

fn compile(expression: &str, pattern: &str) -> Result<Glob, TableError> {
    Glob::new(pattern).map_err(|source| TableError::InvalidGlob {
        expression: expression.to_string(),
        source,
    })
}
