//! Feature deriver: medal share within an edition and lag-1 trend features
//! under an explicit chronological edition order

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::CountryEditionSummary;
use crate::loader::RawHost;
use crate::order::NullsLast;

/// Field order is the column order of `country_features`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub country_name: Option<String>,
    pub slug_game: Option<String>,
    pub medals_total: i64,
    pub athletes_unique: i64,
    pub avg_rank: Option<f64>,
    pub medal_share: f64,
    pub medals_total_lag_1: i64,
    pub athletes_unique_lag_1: i64,
}

/// Trailing 4-digit year of a slug: `tokyo-2020` → 2020.
pub fn slug_year(slug: &str) -> Option<i32> {
    let tail = slug.rsplit('-').next()?;
    if tail.len() == 4 && tail.bytes().all(|b| b.is_ascii_digit()) {
        tail.parse().ok()
    } else {
        None
    }
}

/// Edition slug → year, from the hosts table with the slug as fallback.
#[derive(Debug, Clone, Default)]
pub struct EditionCalendar {
    years: FxHashMap<String, i32>,
}

impl EditionCalendar {
    pub fn from_hosts(hosts: &[RawHost]) -> Self {
        let years = hosts
            .iter()
            .filter_map(|h| Some((h.game_slug.clone()?, h.game_year?)))
            .collect();
        Self { years }
    }

    pub fn year_of(&self, slug: &str) -> Option<i32> {
        self.years.get(slug).copied().or_else(|| slug_year(slug))
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Share of an edition's medals; a zero edition total divides by 1.
pub fn medal_share(medals_total: i64, edition_total: i64) -> f64 {
    let divisor = if edition_total == 0 { 1 } else { edition_total };
    medals_total as f64 / divisor as f64
}

fn edition_totals(summary: &[CountryEditionSummary]) -> FxHashMap<Option<&str>, i64> {
    let mut totals: FxHashMap<Option<&str>, i64> = FxHashMap::default();
    for row in summary {
        *totals.entry(row.slug_game.as_deref()).or_default() += row.medals_total;
    }
    totals
}

type SortKey<'a> = (NullsLast<&'a str>, NullsLast<i32>, NullsLast<&'a str>);

fn sort_key<'a>(row: &'a CountryEditionSummary, calendar: &EditionCalendar) -> SortKey<'a> {
    let slug = row.slug_game.as_deref();
    (
        NullsLast(row.country_name.as_deref()),
        NullsLast(slug.and_then(|s| calendar.year_of(s))),
        NullsLast(slug),
    )
}

/// Add shares and lag-1 features. Rows come back sorted by country, then
/// chronologically; undated editions follow dated ones.
pub fn derive_features(
    summary: &[CountryEditionSummary],
    calendar: &EditionCalendar,
) -> Vec<FeatureRow> {
    let totals = edition_totals(summary);

    let mut order: Vec<&CountryEditionSummary> = summary.iter().collect();
    // Stable: equal keys keep input order
    order.sort_by(|a, b| sort_key(a, calendar).cmp(&sort_key(b, calendar)));

    report_undated(summary, calendar);
    report_lexicographic_mismatch(&order);

    let mut out = Vec::with_capacity(order.len());
    let mut prev: Option<&CountryEditionSummary> = None;
    for row in order {
        let same_country = row.country_name.is_some()
            && prev.is_some_and(|p| p.country_name == row.country_name);
        let (medals_lag, athletes_lag) = match prev {
            Some(p) if same_country => (p.medals_total, p.athletes_unique),
            _ => (0, 0),
        };
        let edition_total = totals
            .get(&row.slug_game.as_deref())
            .copied()
            .unwrap_or_default();
        out.push(FeatureRow {
            country_name: row.country_name.clone(),
            slug_game: row.slug_game.clone(),
            medals_total: row.medals_total,
            athletes_unique: row.athletes_unique,
            avg_rank: row.avg_rank,
            medal_share: medal_share(row.medals_total, edition_total),
            medals_total_lag_1: medals_lag,
            athletes_unique_lag_1: athletes_lag,
        });
        prev = Some(row);
    }
    out
}

fn report_undated(summary: &[CountryEditionSummary], calendar: &EditionCalendar) {
    let undated: BTreeSet<&str> = summary
        .iter()
        .filter_map(|r| r.slug_game.as_deref())
        .filter(|s| calendar.year_of(s).is_none())
        .collect();
    if undated.is_empty() {
        return;
    }
    let sample: Vec<&str> = undated.iter().take(5).copied().collect();
    log::warn!(
        "{} editions have no known year and are ordered after dated ones: {}{}",
        undated.len(),
        sample.join(", "),
        if undated.len() > sample.len() { ", ..." } else { "" }
    );
}

/// Countries whose editions, taken chronologically, are not in slug order.
fn report_lexicographic_mismatch(sorted: &[&CountryEditionSummary]) -> usize {
    let mut mismatched = 0;
    for group in sorted.chunk_by(|a, b| a.country_name == b.country_name) {
        let Some(country) = group[0].country_name.as_deref() else {
            continue;
        };
        let slugs: Vec<&str> = group.iter().filter_map(|r| r.slug_game.as_deref()).collect();
        if let Some(w) = slugs.windows(2).find(|w| w[0] > w[1]) {
            mismatched += 1;
            log::debug!(
                "{country}: {} precedes {} chronologically but not by slug",
                w[0],
                w[1]
            );
        }
    }
    if mismatched > 0 {
        log::warn!(
            "{mismatched} countries have editions whose slug order differs from chronological order; lag features follow chronology"
        );
    }
    mismatched
}
