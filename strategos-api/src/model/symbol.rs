use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("expected BASE/QUOTE notation, got '{0}'")]
    Notation(String),
    #[error("empty base or quote currency in '{0}'")]
    EmptyComponent(String),
}

/// A tradable instrument identifier, e.g. `BTC/USD`.
///
/// The quote currency (right-hand side) is the currency all values and
/// prices are denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    base: String,
    quote: String,
}

impl Symbol {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Exchange-facing notation (`BASE-QUOTE`). Pure string transform.
    pub fn exchange_code(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Parses the exchange-facing `BASE-QUOTE` notation back into a symbol.
    pub fn from_exchange_code(code: &str) -> Result<Self, SymbolError> {
        Self::split(code, '-')
    }

    fn split(raw: &str, separator: char) -> Result<Self, SymbolError> {
        let mut parts = raw.splitn(2, separator);
        let base = parts.next().unwrap_or_default();
        let quote = match parts.next() {
            Some(q) => q,
            None => return Err(SymbolError::Notation(raw.to_string())),
        };
        if base.is_empty() || quote.is_empty() {
            return Err(SymbolError::EmptyComponent(raw.to_string()));
        }
        Ok(Self::new(base, quote))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::split(s, '/')
    }
}
