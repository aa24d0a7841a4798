//! Athlete-list normalizer: typed entries from the serialized `athletes` cell,
//! exploded into one row per (result, athlete)

use rayon::prelude::*;

use crate::literal::{Literal, parse_literal};
use crate::loader::RawResult;

/// One participant named in a result's athlete list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AthleteEntry {
    pub name: Option<String>,
    pub profile_url: Option<String>,
}

/// Outcome of parsing one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCell {
    /// Null, or not a list rendering.
    Absent,
    Entries(Vec<AthleteEntry>),
    /// Started like a list but failed to parse.
    Malformed,
}

impl ParsedCell {
    pub fn into_entries(self) -> Vec<AthleteEntry> {
        match self {
            Self::Entries(entries) => entries,
            Self::Absent | Self::Malformed => Vec::new(),
        }
    }
}

/// Parse a cell, keeping track of why it produced no entries.
pub fn parse_cell(cell: Option<&str>) -> ParsedCell {
    let Some(text) = cell else {
        return ParsedCell::Absent;
    };
    if !text.starts_with('[') {
        return ParsedCell::Absent;
    }
    match parse_literal(text) {
        Ok(Literal::Seq(items)) => ParsedCell::Entries(items.into_iter().filter_map(pair).collect()),
        Ok(_) => ParsedCell::Malformed,
        Err(e) => {
            log::trace!("athlete list rejected: {e}");
            ParsedCell::Malformed
        }
    }
}

/// Parsed entries of a cell; absent or malformed cells give an empty list.
pub fn parse_athlete_list(cell: Option<&str>) -> Vec<AthleteEntry> {
    parse_cell(cell).into_entries()
}

/// Exactly two elements, else dropped.
fn pair(item: Literal) -> Option<AthleteEntry> {
    let Literal::Seq(elems) = item else {
        return None;
    };
    let [name, url]: [Literal; 2] = elems.try_into().ok()?;
    Some(AthleteEntry {
        name: name.into_text(),
        profile_url: url.into_text(),
    })
}

/// A result row paired with one of its athletes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplodedResult<'a> {
    pub result: &'a RawResult,
    pub athlete_url: Option<String>,
    pub athlete_full_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplodeStats {
    pub results: usize,
    pub rows: usize,
    pub malformed: usize,
    /// Results that contributed a single athlete-less row.
    pub empty: usize,
}

/// Flatten every result into one row per parsed athlete.
///
/// A result whose list is empty still yields one row. Identity fields already
/// present on the result row take precedence over the exploded pair.
pub fn explode(results: &[RawResult]) -> (Vec<ExplodedResult<'_>>, ExplodeStats) {
    let parsed: Vec<ParsedCell> = results
        .par_iter()
        .map(|r| parse_cell(r.athletes.as_deref()))
        .collect();

    let mut stats = ExplodeStats {
        results: results.len(),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(results.len());
    for (result, cell) in results.iter().zip(parsed) {
        if cell == ParsedCell::Malformed {
            stats.malformed += 1;
        }
        let entries = cell.into_entries();
        if entries.is_empty() {
            stats.empty += 1;
            rows.push(ExplodedResult {
                result,
                athlete_url: result.athlete_url.clone(),
                athlete_full_name: result.athlete_full_name.clone(),
            });
            continue;
        }
        for entry in entries {
            rows.push(ExplodedResult {
                result,
                athlete_url: result.athlete_url.clone().or(entry.profile_url),
                athlete_full_name: result.athlete_full_name.clone().or(entry.name),
            });
        }
    }
    stats.rows = rows.len();

    if stats.malformed > 0 {
        log::debug!(
            "{} of {} athlete lists failed to parse",
            stats.malformed,
            stats.results
        );
    }
    (rows, stats)
}
