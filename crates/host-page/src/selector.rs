//! The CSS subset the enhancer's locator chains are written in.
//!
//! A selector is a single compound selector: an optional type (`textarea`, `div`, `*`), an
//! optional `#id`, and any number of attribute filters (`[name]`, `[name="v"]`, `[name*="v"]`).
//! Combinators and pseudo-classes are not part of the subset.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected '{found}' at offset {offset} in selector '{selector}'")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },

    #[error("unterminated {what} in selector '{selector}'")]
    Unterminated {
        selector: String,
        what: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeMatch {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeFilter {
    pub name: String,
    pub matcher: AttributeMatch,
}

impl AttributeFilter {
    fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        match (&self.matcher, attributes.get(&self.name)) {
            (_, None) => false,
            (AttributeMatch::Exists, Some(_)) => true,
            (AttributeMatch::Equals(expected), Some(actual)) => actual == expected,
            // `[a*=""]` never matches, per the selectors spec.
            (AttributeMatch::Contains(needle), Some(actual)) => {
                !needle.is_empty() && actual.contains(needle.as_str())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    id: Option<String>,
    attributes: Vec<AttributeFilter>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }
        Parser::new(source).parse()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn attributes(&self) -> &[AttributeFilter] {
        &self.attributes
    }

    /// Tests an element given its tag name and attribute map. Tag comparison is
    /// case-insensitive, attribute values are compared exactly.
    pub fn matches(&self, tag: &str, attributes: &BTreeMap<String, String>) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if attributes.get("id") != Some(id) {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|filter| filter.matches(attributes))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        let mut tag = None;
        let mut id = None;
        let mut attributes = Vec::new();

        if let Some(&(_, c)) = self.chars.peek() {
            if c == '*' {
                self.chars.next();
            } else if is_ident_char(c) {
                tag = Some(self.ident()?.to_ascii_lowercase());
            }
        }

        while let Some((offset, c)) = self.chars.next() {
            match c {
                '#' => id = Some(self.ident()?),
                '[' => attributes.push(self.attribute()?),
                other => return Err(self.unexpected(other, offset)),
            }
        }

        Ok(Selector {
            source: self.source.to_string(),
            tag,
            id,
            attributes,
        })
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(match self.chars.peek() {
                Some(&(offset, found)) => self.unexpected(found, offset),
                None => self.unterminated("identifier"),
            });
        }
        Ok(out)
    }

    fn attribute(&mut self) -> Result<AttributeFilter, SelectorError> {
        let name = self.ident()?;
        let (offset, c) = self
            .chars
            .next()
            .ok_or_else(|| self.unterminated("attribute filter"))?;
        let matcher = match c {
            ']' => return Ok(AttributeFilter {
                name,
                matcher: AttributeMatch::Exists,
            }),
            '=' => AttributeMatch::Equals(self.value()?),
            '*' => {
                match self.chars.next() {
                    Some((_, '=')) => {}
                    Some((offset, found)) => return Err(self.unexpected(found, offset)),
                    None => return Err(self.unterminated("attribute filter")),
                }
                AttributeMatch::Contains(self.value()?)
            }
            other => return Err(self.unexpected(other, offset)),
        };
        match self.chars.next() {
            Some((_, ']')) => Ok(AttributeFilter { name, matcher }),
            Some((offset, found)) => Err(self.unexpected(found, offset)),
            None => Err(self.unterminated("attribute filter")),
        }
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.chars.peek() {
            Some(&(_, quote)) if quote == '"' || quote == '\'' => {
                self.chars.next();
                let mut out = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, c)) if c == quote => return Ok(out),
                        Some((_, c)) => out.push(c),
                        None => return Err(self.unterminated("quoted value")),
                    }
                }
            }
            _ => self.ident(),
        }
    }

    fn unexpected(&self, found: char, offset: usize) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            found,
            offset,
        }
    }

    fn unterminated(&self, what: &'static str) -> SelectorError {
        SelectorError::Unterminated {
            selector: self.source.to_string(),
            what,
        }
    }
}
