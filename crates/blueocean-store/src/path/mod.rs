//! State path addressing
//!
//! Paths are `/`-delimited token strings such as
//! `pipelines/[name=my%20job]/branches/[0]`. A lone `/` or the empty string
//! denotes the root of the state tree. A path is parsed once into a
//! [`StatePath`] and then resolved any number of times.

mod resolver;
mod token;

pub use resolver::{resolve, resolve_parent};
pub(crate) use resolver::{Step, locate, locate_child, rebuild};
pub use token::{PathToken, TokenKind};

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A parsed, typed state path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatePath {
    tokens: Vec<PathToken>,
}

impl StatePath {
    /// The root sentinel `/`
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Self {
        Self::from_tokens(path.split('/'))
    }

    /// Build a path from an already split token sequence.
    ///
    /// A leading and a trailing empty token are dropped, exactly as a leading
    /// and trailing slash are dropped from a path string.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: Vec<S> = tokens.into_iter().collect();
        let mut kept: &[S] = &owned;

        if kept.first().is_some_and(|t| t.as_ref().is_empty()) {
            kept = &kept[1..];
        }
        if kept.last().is_some_and(|t| t.as_ref().is_empty()) {
            kept = &kept[..kept.len() - 1];
        }

        Self {
            tokens: kept.iter().map(|t| PathToken::parse(t.as_ref())).collect(),
        }
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The path with its last token removed; `None` for the root
    pub fn parent(&self) -> Option<StatePath> {
        let (_, parent) = self.tokens.split_last()?;
        Some(Self {
            tokens: parent.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&PathToken> {
        self.tokens.last()
    }

    /// The path extended by one token
    pub fn child(&self, token: &str) -> StatePath {
        let mut tokens = self.tokens.clone();
        tokens.push(PathToken::parse(token));
        Self { tokens }
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return f.write_str("/");
        }
        for token in &self.tokens {
            write!(f, "/{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for StatePath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StatePath::parse(s))
    }
}

impl From<&str> for StatePath {
    fn from(path: &str) -> Self {
        StatePath::parse(path)
    }
}

impl From<String> for StatePath {
    fn from(path: String) -> Self {
        StatePath::parse(&path)
    }
}

impl From<&String> for StatePath {
    fn from(path: &String) -> Self {
        StatePath::parse(path)
    }
}

impl From<&StatePath> for StatePath {
    fn from(path: &StatePath) -> Self {
        path.clone()
    }
}

impl From<Vec<PathToken>> for StatePath {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self { tokens }
    }
}

/// Split a path string into its raw tokens
pub fn tokenize(path: &str) -> Vec<String> {
    StatePath::parse(path)
        .tokens
        .into_iter()
        .map(|t| t.raw().to_string())
        .collect()
}
