//! Declarative column-matching configuration: which strategy locates which
//! target field, driven by named keyword sets. Loaded once at startup into an
//! immutable [`Config`] value that is passed by reference into the
//! transformer; there is no global configuration state.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::transform::matchers::Matcher;

/// Configuration shipped with the binary, used when no explicit path is
/// given.
pub const DEFAULT_CONFIG: &str = include_str!("../config/columns.json");

/// Strategy identifiers as they appear in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    FindHeader,
    FindMostMatchesHeader,
    FindMostMatchesColumn,
    FindWordMatchesColumn,
    FindFilteredWordMatchesColumn,
    FindNumericColumnWithLengthMatches,
}

impl Strategy {
    /// Number of keyword sets the strategy consumes.
    fn arity(self) -> usize {
        match self {
            Strategy::FindFilteredWordMatchesColumn => 2,
            _ => 1,
        }
    }
}

/// Named ordered sequence of match tokens. For the numeric-length strategy
/// the items are digit-run lengths written as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordSet {
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ColumnRule {
    target_field: String,
    strategy: Strategy,
    keyword_sets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    keyword_sets: HashMap<String, KeywordSet>,
    columns: Vec<ColumnRule>,
}

/// One target field of the canonical schema with its fully-resolved matcher.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub target_field: String,
    pub matcher: Matcher,
}

/// Validated, resolved configuration. Immutable after load; safe to share
/// across threads by reference.
#[derive(Debug, Clone)]
pub struct Config {
    rules: Vec<ColumnSpec>,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Config> {
        let raw = fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config `{}`", path.as_ref().display()))?;
        Config::from_json(&raw)
    }

    /// Parse and validate: every keyword-set reference must resolve, the
    /// reference count must match the strategy, and numeric-length sets must
    /// parse as integers. Bad configuration is rejected here, before any run
    /// starts.
    pub fn from_json(json: &str) -> Result<Config> {
        let file: ConfigFile = serde_json::from_str(json).context("parsing column configuration")?;

        let mut rules = Vec::with_capacity(file.columns.len());
        for rule in &file.columns {
            if rule.keyword_sets.len() != rule.strategy.arity() {
                bail!(
                    "column `{}`: strategy expects {} keyword set(s), got {}",
                    rule.target_field,
                    rule.strategy.arity(),
                    rule.keyword_sets.len()
                );
            }
            let sets: Vec<&KeywordSet> = rule
                .keyword_sets
                .iter()
                .map(|name| {
                    file.keyword_sets.get(name).with_context(|| {
                        format!(
                            "column `{}` references unknown keyword set `{}`",
                            rule.target_field, name
                        )
                    })
                })
                .collect::<Result<_>>()?;

            let matcher = match rule.strategy {
                Strategy::FindHeader => Matcher::Header {
                    keywords: sets[0].items.clone(),
                },
                Strategy::FindMostMatchesHeader => Matcher::HeaderSubstrings {
                    keywords: sets[0].items.clone(),
                },
                Strategy::FindMostMatchesColumn => Matcher::CellSubstrings {
                    keywords: sets[0].items.clone(),
                },
                Strategy::FindWordMatchesColumn => Matcher::CellWords {
                    keywords: sets[0].items.clone(),
                },
                Strategy::FindFilteredWordMatchesColumn => Matcher::CellWordsFiltered {
                    include: sets[0].items.clone(),
                    exclude: sets[1].items.clone(),
                },
                Strategy::FindNumericColumnWithLengthMatches => {
                    let lengths = sets[0]
                        .items
                        .iter()
                        .map(|item| {
                            item.parse::<usize>().with_context(|| {
                                format!(
                                    "column `{}`: length `{}` is not an integer",
                                    rule.target_field, item
                                )
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Matcher::NumericLengths { lengths }
                }
            };

            rules.push(ColumnSpec {
                target_field: rule.target_field.clone(),
                matcher,
            });
        }

        Ok(Config { rules })
    }

    /// Target-field specs in canonical output order.
    pub fn rules(&self) -> &[ColumnSpec] {
        &self.rules
    }
}
