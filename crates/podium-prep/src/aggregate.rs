//! Aggregator: per (country, edition) summary of the full table

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::order::NullsLast;
use crate::unify::UnifiedResult;

/// Field order is the column order of `country_year_summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryEditionSummary {
    pub country_name: Option<String>,
    pub slug_game: Option<String>,
    pub medals_total: i64,
    pub athletes_unique: i64,
    pub avg_rank: Option<f64>,
}

#[derive(Default)]
struct GroupAcc<'a> {
    medals: i64,
    names: FxHashSet<&'a str>,
    rank_sum: f64,
    rank_count: usize,
}

type GroupKey<'a> = (NullsLast<&'a str>, NullsLast<&'a str>);

/// Group by `(country_name, slug_game)`. Null keys form their own groups;
/// groups come out sorted with nulls last.
pub fn summarize(rows: &[UnifiedResult]) -> Vec<CountryEditionSummary> {
    let mut groups: BTreeMap<GroupKey<'_>, GroupAcc<'_>> = BTreeMap::new();
    for row in rows {
        let key = (
            NullsLast(row.country_name.as_deref()),
            NullsLast(row.slug_game.as_deref()),
        );
        let acc = groups.entry(key).or_default();
        acc.medals += i64::from(row.medal_flag);
        if let Some(name) = row.athlete_full_name.as_deref() {
            acc.names.insert(name);
        }
        if let Some(rank) = row.rank_position {
            acc.rank_sum += rank;
            acc.rank_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|((country, slug), acc)| CountryEditionSummary {
            country_name: country.0.map(str::to_string),
            slug_game: slug.0.map(str::to_string),
            medals_total: acc.medals,
            athletes_unique: acc.names.len() as i64,
            avg_rank: (acc.rank_count > 0).then(|| acc.rank_sum / acc.rank_count as f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: Option<&str>, slug: &str, name: Option<&str>, rank: Option<f64>, flag: u8) -> UnifiedResult {
        UnifiedResult {
            country_name: country.map(str::to_string),
            slug_game: Some(slug.to_string()),
            athlete_full_name: name.map(str::to_string),
            rank_position: rank,
            medal_flag: flag,
            medal_type_final: (flag == 1).then(|| "GOLD".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn sums_counts_and_averages() {
        let rows = vec![
            row(Some("Kenya"), "tokyo-2020", Some("A"), Some(1.0), 1),
            row(Some("Kenya"), "tokyo-2020", Some("A"), Some(4.0), 0),
            row(Some("Kenya"), "tokyo-2020", Some("B"), None, 1),
            row(Some("Kenya"), "tokyo-2020", None, None, 0),
        ];
        let s = summarize(&rows);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].medals_total, 2);
        assert_eq!(s[0].athletes_unique, 2);
        assert_eq!(s[0].avg_rank, Some(2.5));
    }

    #[test]
    fn all_null_ranks_give_null_average() {
        let rows = vec![row(Some("Chad"), "rio-2016", Some("A"), None, 0)];
        let s = summarize(&rows);
        assert_eq!(s[0].avg_rank, None);
        assert_eq!(s[0].medals_total, 0);
    }

    #[test]
    fn null_country_is_its_own_group_sorted_last() {
        let rows = vec![
            row(None, "rio-2016", Some("X"), None, 1),
            row(Some("Zambia"), "rio-2016", Some("Y"), None, 0),
            row(Some("Angola"), "rio-2016", Some("Z"), None, 0),
            row(None, "rio-2016", Some("W"), None, 0),
        ];
        let s = summarize(&rows);
        let keys: Vec<_> = s.iter().map(|g| g.country_name.as_deref()).collect();
        assert_eq!(keys, vec![Some("Angola"), Some("Zambia"), None]);
        assert_eq!(s[2].medals_total, 1);
        assert_eq!(s[2].athletes_unique, 2);
    }

    #[test]
    fn medals_total_equals_flagged_row_count() {
        let rows: Vec<UnifiedResult> = (0..20)
            .map(|i| {
                let country = if i % 3 == 0 { "Kenya" } else { "Peru" };
                let slug = if i % 2 == 0 { "tokyo-2020" } else { "rio-2016" };
                row(Some(country), slug, Some("N"), None, (i % 4 == 0) as u8)
            })
            .collect();
        for group in summarize(&rows) {
            let flagged = rows
                .iter()
                .filter(|r| r.country_name == group.country_name && r.slug_game == group.slug_game)
                .filter(|r| r.medal_flag == 1)
                .count() as i64;
            assert_eq!(group.medals_total, flagged);
        }
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(summarize(&[]).is_empty());
    }
}
