//! Key paths — parsing and formatting of store addresses.
//!
//! A path is one or more keys. Each key is either a name (`sep`,
//! `win.loc`) or a 1-based position (`[2]`). Textual paths separate
//! segments with `/` and append positions in brackets:
//!
//! ```text
//! sep              -> [Name("sep")]
//! vars/x[2]        -> [Name("vars"), Name("x"), Index(2)]
//! [1][3]           -> [Index(1), Index(3)]
//! a\/b             -> [Name("a/b")]
//! ```
//!
//! Names may contain dots; `.` is never a separator. A backslash escapes
//! `/`, `[`, `]` and itself inside a name, and `Display` writes names with
//! those escapes so that printing and re-parsing gives the same keys.
//!
//! On the wire a path is a JSON array of keys (`["vars", "x", 2]`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Errors from parsing a textual key path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("empty path")]
    Empty,
    #[error("empty segment in path '{0}'")]
    EmptySegment(String),
    #[error("unbalanced brackets in path '{0}'")]
    Unbalanced(String),
    #[error("invalid index '{index}' in path '{path}'")]
    InvalidIndex { path: String, index: String },
    #[error("dangling escape at end of path '{0}'")]
    DanglingEscape(String),
}


/// A single key within a path.
///
/// `Index` is positional: it addresses whatever entry currently sits at
/// that (1-based) position in its table. Inserting or removing entries
/// changes what an index resolves to; it is not a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => {
                for c in name.chars() {
                    if matches!(c, '\\' | '/' | '[' | ']') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            Key::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}


/// A non-empty sequence of keys addressing one location in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Key>", into = "Vec<Key>")]
pub struct KeyPath {
    keys: Vec<Key>,
}

impl KeyPath {
    /// Build a path from explicit keys. Fails if `keys` is empty or holds
    /// a zero index.
    pub fn from_keys(keys: Vec<Key>) -> Result<Self, PathParseError> {
        if keys.is_empty() {
            return Err(PathParseError::Empty);
        }
        if keys.contains(&Key::Index(0)) {
            return Err(PathParseError::InvalidIndex {
                path: KeyPath { keys }.to_string(),
                index: "0".into(),
            });
        }
        Ok(KeyPath { keys })
    }

    /// A one-key path.
    pub fn single(key: impl Into<Key>) -> Self {
        KeyPath { keys: vec![key.into()] }
    }

    /// Extend this path by one key.
    pub fn child(mut self, key: impl Into<Key>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Parse a textual path such as `vars/x[2]`.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        if input.is_empty() {
            return Err(PathParseError::Empty);
        }
        let mut parser = Parser {
            input,
            keys: Vec::new(),
            name: String::new(),
            named: false,
            indexed: false,
        };
        parser.run()?;
        KeyPath::from_keys(parser.keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The top-level name when the path is exactly one named key.
    pub fn as_single_name(&self) -> Option<&str> {
        match self.keys.as_slice() {
            [Key::Name(name)] => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            // Index keys attach to the previous segment as a suffix.
            if i > 0 && matches!(key, Key::Name(_)) {
                f.write_str("/")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

impl TryFrom<Vec<Key>> for KeyPath {
    type Error = PathParseError;

    fn try_from(keys: Vec<Key>) -> Result<Self, Self::Error> {
        KeyPath::from_keys(keys)
    }
}

impl From<KeyPath> for Vec<Key> {
    fn from(path: KeyPath) -> Self {
        path.keys
    }
}

impl From<&str> for KeyPath {
    /// A single named key, taken verbatim (no parsing).
    fn from(name: &str) -> Self {
        KeyPath::single(name)
    }
}

impl From<Key> for KeyPath {
    fn from(key: Key) -> Self {
        KeyPath::single(key)
    }
}


// ---------------------------------------------------------------------------
// Internal: textual parsing
// ---------------------------------------------------------------------------

/// Scanner state for one pass over a textual path.
struct Parser<'a> {
    input: &'a str,
    keys: Vec<Key>,
    /// Name characters of the current segment, escapes removed.
    name: String,
    /// The current segment has name characters.
    named: bool,
    /// The current segment already has an index suffix.
    indexed: bool,
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), PathParseError> {
        let input = self.input;
        let mut chars = input.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| PathParseError::DanglingEscape(input.to_string()))?;
                    self.push_name_char(escaped)?;
                }
                '/' => self.end_segment()?,
                '[' => {
                    self.flush_name();
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some('[') | None => return Err(self.unbalanced()),
                            Some(d) => digits.push(d),
                        }
                    }
                    let index = match digits.parse::<usize>() {
                        Ok(i) if i > 0 => i,
                        _ => {
                            return Err(PathParseError::InvalidIndex {
                                path: input.to_string(),
                                index: digits,
                            })
                        }
                    };
                    self.keys.push(Key::Index(index));
                    self.indexed = true;
                }
                ']' => return Err(self.unbalanced()),
                other => self.push_name_char(other)?,
            }
        }
        self.end_segment()
    }

    fn push_name_char(&mut self, c: char) -> Result<(), PathParseError> {
        // A name cannot follow an index inside one segment (`a[1]b`).
        if self.indexed {
            return Err(self.unbalanced());
        }
        self.name.push(c);
        self.named = true;
        Ok(())
    }

    fn flush_name(&mut self) {
        if self.named {
            self.keys.push(Key::Name(std::mem::take(&mut self.name)));
            self.named = false;
        }
    }

    fn end_segment(&mut self) -> Result<(), PathParseError> {
        if !self.named && !self.indexed {
            return Err(PathParseError::EmptySegment(self.input.to_string()));
        }
        self.flush_name();
        self.indexed = false;
        Ok(())
    }

    fn unbalanced(&self) -> PathParseError {
        PathParseError::Unbalanced(self.input.to_string())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
