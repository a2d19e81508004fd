//! Engine input deck.
//!
//! A key/value configuration carrying physical units, read from and written
//! to the engine's plain-text input format:
//!
//! ```text
//! negf                              # run-level argument
//! RTstep= 10 as                     # scalar with unit
//! Field1_kind= "QSSIN"              # text
//! % Field1_Dir                      # table
//!  0 | 0 | 1 |
//! %
//! % IOCachetime
//!  0.3 | 0.3 | fs                   # table with trailing unit
//! %
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// A single input deck value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeckValue {
    /// Real scalar with an optional physical unit.
    Number { value: f64, unit: Option<String> },
    /// Quoted text.
    Text(String),
    /// Row of reals with an optional physical unit.
    Table { values: Vec<f64>, unit: Option<String> },
}

impl DeckValue {
    /// Scalar with a unit, e.g. `[30, "as"]`.
    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        Self::Number {
            value,
            unit: Some(unit.into()),
        }
    }

    /// Table with a unit, e.g. `[[0.3, 0.3], "fs"]`.
    pub fn table(values: Vec<f64>, unit: impl Into<String>) -> Self {
        Self::Table {
            values,
            unit: Some(unit.into()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for DeckValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { value, unit } => match unit {
                Some(unit) => write!(f, "{value} {unit}"),
                None => write!(f, "{value}"),
            },
            Self::Text(text) => write!(f, "\"{text}\""),
            Self::Table { values, unit } => {
                for value in values {
                    write!(f, " {value} |")?;
                }
                if let Some(unit) = unit {
                    write!(f, " {unit}")?;
                }
                Ok(())
            }
        }
    }
}

/// Engine input deck: run-level arguments plus named variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDeck {
    arguments: Vec<String>,
    variables: BTreeMap<String, DeckValue>,
}

impl InputDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run-level arguments (bare words such as `negf` or `dipoles`).
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn push_argument(&mut self, argument: impl Into<String>) {
        let argument = argument.into();
        if !self.arguments.contains(&argument) {
            self.arguments.push(argument);
        }
    }

    pub fn get(&self, name: &str) -> Option<&DeckValue> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Set or replace a variable.
    pub fn set(&mut self, name: impl Into<String>, value: DeckValue) {
        self.variables.insert(name.into(), value);
    }

    /// Scalar value and its unit, if `name` holds a number.
    pub fn number(&self, name: &str) -> Option<(f64, Option<&str>)> {
        match self.variables.get(name)? {
            DeckValue::Number { value, unit } => Some((*value, unit.as_deref())),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.variables.get(name)? {
            DeckValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn table(&self, name: &str) -> Option<&[f64]> {
        match self.variables.get(name)? {
            DeckValue::Table { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Variable names in serialization order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Read and parse a deck from disk.
    pub async fn read(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::io(path, e))?;
        content.parse()
    }

    /// Serialize the deck to disk, replacing any existing file.
    pub async fn write(&self, path: impl AsRef<Path>) -> DomainResult<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.to_string())
            .await
            .map_err(|e| DomainError::io(path, e))
    }
}

impl fmt::Display for InputDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for argument in &self.arguments {
            writeln!(f, "{argument}")?;
        }
        for (name, value) in &self.variables {
            match value {
                DeckValue::Table { .. } => writeln!(f, "% {name}\n{value}\n%")?,
                _ => writeln!(f, "{name}= {value}")?,
            }
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(content, _)| content).trim()
}

fn parse_scalar(raw: &str, line: usize) -> DomainResult<DeckValue> {
    if let Some(quoted) = raw.strip_prefix('"') {
        let text = quoted.split_once('"').map(|(text, _)| text).ok_or_else(|| {
            DomainError::Deck {
                line,
                reason: "unterminated string".to_string(),
            }
        })?;
        return Ok(DeckValue::Text(text.to_string()));
    }

    let mut tokens = raw.split_whitespace();
    let first = tokens.next().ok_or_else(|| DomainError::Deck {
        line,
        reason: "missing value".to_string(),
    })?;
    match first.parse::<f64>() {
        Ok(value) => Ok(DeckValue::Number {
            value,
            unit: tokens.next().map(str::to_string),
        }),
        Err(_) => Ok(DeckValue::Text(raw.to_string())),
    }
}

fn parse_table_row(
    row: &str,
    line: usize,
    values: &mut Vec<f64>,
    unit: &mut Option<String>,
) -> DomainResult<()> {
    let tokens: Vec<&str> = row.split('|').map(str::trim).filter(|t| !t.is_empty()).collect();
    for (i, token) in tokens.iter().enumerate() {
        if let Ok(value) = token.parse::<f64>() {
            values.push(value);
        } else if i + 1 == tokens.len() {
            *unit = Some((*token).to_string());
        } else {
            return Err(DomainError::Deck {
                line,
                reason: format!("non-numeric table entry '{token}'"),
            });
        }
    }
    Ok(())
}

impl FromStr for InputDeck {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut deck = Self::new();
        let mut lines = s.lines().enumerate().map(|(i, l)| (i + 1, strip_comment(l)));

        while let Some((line, content)) = lines.next() {
            if content.is_empty() {
                continue;
            }

            if let Some(name) = content.strip_prefix('%') {
                let name = name.trim();
                if name.is_empty() {
                    return Err(DomainError::Deck {
                        line,
                        reason: "table terminator without an open table".to_string(),
                    });
                }
                let mut values = Vec::new();
                let mut unit = None;
                let mut closed = false;
                for (row_line, row) in lines.by_ref() {
                    if row == "%" {
                        closed = true;
                        break;
                    }
                    parse_table_row(row, row_line, &mut values, &mut unit)?;
                }
                if !closed {
                    return Err(DomainError::Deck {
                        line,
                        reason: format!("table {name} is not closed"),
                    });
                }
                deck.set(name, DeckValue::Table { values, unit });
            } else if let Some((name, raw)) = content.split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    return Err(DomainError::Deck {
                        line,
                        reason: "assignment without a variable name".to_string(),
                    });
                }
                deck.set(name, parse_scalar(raw.trim(), line)?);
            } else if let Some(argument) = content.split_whitespace().next() {
                deck.push_argument(argument);
            }
        }

        Ok(deck)
    }
}
