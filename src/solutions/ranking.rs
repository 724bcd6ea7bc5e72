//! Ranking: order contestants by score, best first. Contestants with equal scores share a
//! rank; the next distinct score is ranked by its position ("1224" ranking).
//!
//! Input: one test case per contest, introduced by the number of contestants, one
//! `name score` per line. Output: `index rank name score`, one line per contestant.

use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::config::HarnessConfig;
use crate::io::fields::{FieldError, split_index};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contestant {
    pub name: String,
    pub score: i64,
}

impl Contestant {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Splits `text` into everything before the last field and the last field parsed as score.
fn split_score(text: &str) -> Result<(&str, i64), FieldError> {
    let text = text.trim();
    let (name, score) = text
        .rsplit_once(char::is_whitespace)
        .ok_or(FieldError::FieldCount {
            expected: 2,
            found: usize::from(!text.is_empty()),
        })?;

    let score = score.parse().map_err(|_| FieldError::InvalidField {
        field: score.to_string(),
    })?;

    Ok((name.trim_end(), score))
}

impl FromStr for Contestant {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, score) = split_score(s)?;
        Ok(Self::new(name, score))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub name: String,
    pub score: i64,
}

impl FromStr for Standing {
    type Err = FieldError;

    /// Parses `rank name score`; the name may contain spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rank, rest) = split_index(s)?;
        let (name, score) = split_score(rest)?;

        Ok(Self {
            rank,
            name: name.to_string(),
            score,
        })
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.rank, self.name, self.score)
    }
}

/// Ranks the contestants by descending score. Ties keep their input order.
pub fn rank(contestants: &[Contestant]) -> Vec<Standing> {
    let mut standings = Vec::with_capacity(contestants.len());

    for (_, tied) in &contestants
        .iter()
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .chunk_by(|c| c.score)
    {
        let rank = standings.len() + 1;
        standings.extend(tied.map(|c| Standing {
            rank,
            name: c.name.clone(),
            score: c.score,
        }));
    }

    standings
}

pub fn config() -> HarnessConfig<Contestant, Standing> {
    HarnessConfig::new(
        |line| Ok(line.parse()?),
        |line| {
            let (index, rest) = split_index(line)?;
            Ok((index, rest.parse()?))
        },
    )
}

/// Adapter for [`crate::Harness::run_groups`].
pub fn solve(contestants: &[Contestant]) -> Vec<Standing> {
    rank(contestants)
}
