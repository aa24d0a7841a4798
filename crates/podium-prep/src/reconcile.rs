//! Medal reconciler: left joins of exploded results against the medals table
//! on `(athlete_url, slug_game, event_title)` and the athletes table on
//! `athlete_url`
//!
//! Null key components never match. Duplicate right-hand keys fan the left
//! row out, in right-table order.

use rustc_hash::FxHashMap;

use crate::athletes::ExplodedResult;
use crate::loader::{RawAthlete, RawMedal};

type MedalKey<'a> = (&'a str, &'a str, &'a str);

/// Medals grouped by their three-part key.
pub struct MedalIndex<'a> {
    by_key: FxHashMap<MedalKey<'a>, Vec<&'a RawMedal>>,
}

impl<'a> MedalIndex<'a> {
    pub fn build(medals: &'a [RawMedal]) -> Self {
        let mut by_key: FxHashMap<MedalKey<'a>, Vec<&'a RawMedal>> = FxHashMap::default();
        for m in medals {
            if let (Some(url), Some(slug), Some(event)) = (
                m.athlete_url.as_deref(),
                m.slug_game.as_deref(),
                m.event_title.as_deref(),
            ) {
                by_key.entry((url, slug, event)).or_default().push(m);
            }
        }
        Self { by_key }
    }

    pub fn lookup(
        &self,
        url: Option<&'a str>,
        slug: Option<&'a str>,
        event: Option<&'a str>,
    ) -> &[&'a RawMedal] {
        match (url, slug, event) {
            (Some(u), Some(s), Some(e)) => self
                .by_key
                .get(&(u, s, e))
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        }
    }

    /// Keys carried by more than one medal row.
    pub fn duplicate_keys(&self) -> usize {
        self.by_key.values().filter(|v| v.len() > 1).count()
    }
}

/// Athlete bios grouped by profile URL.
pub struct ProfileIndex<'a> {
    by_url: FxHashMap<&'a str, Vec<&'a RawAthlete>>,
}

impl<'a> ProfileIndex<'a> {
    pub fn build(athletes: &'a [RawAthlete]) -> Self {
        let mut by_url: FxHashMap<&'a str, Vec<&'a RawAthlete>> = FxHashMap::default();
        for a in athletes {
            if let Some(url) = a.athlete_url.as_deref() {
                by_url.entry(url).or_default().push(a);
            }
        }
        Self { by_url }
    }

    pub fn lookup(&self, url: Option<&'a str>) -> &[&'a RawAthlete] {
        url.and_then(|u| self.by_url.get(u))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// An exploded row with its (optional) medal and profile matches.
#[derive(Debug, Clone, Copy)]
pub struct ReconciledRow<'a> {
    pub exploded: &'a ExplodedResult<'a>,
    pub medal: Option<&'a RawMedal>,
    pub profile: Option<&'a RawAthlete>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Left rows with at least one medal match.
    pub medal_matches: usize,
    /// Extra rows created by duplicate medal keys.
    pub medal_fanout: usize,
    pub profile_matches: usize,
    /// Extra rows created by duplicate profile URLs.
    pub profile_fanout: usize,
}

/// Left-join exploded rows against medals, then against athlete profiles.
pub fn reconcile<'a>(
    rows: &'a [ExplodedResult<'a>],
    medals: &'a [RawMedal],
    athletes: &'a [RawAthlete],
) -> (Vec<ReconciledRow<'a>>, ReconcileStats) {
    let medal_index = MedalIndex::build(medals);
    let profile_index = ProfileIndex::build(athletes);
    let mut stats = ReconcileStats::default();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let url = row.athlete_url.as_deref();
        let medal_hits = medal_index.lookup(
            url,
            row.result.slug_game.as_deref(),
            row.result.event_title.as_deref(),
        );
        let profile_hits = profile_index.lookup(url);

        if !medal_hits.is_empty() {
            stats.medal_matches += 1;
            stats.medal_fanout += medal_hits.len() - 1;
        }
        if !profile_hits.is_empty() {
            stats.profile_matches += 1;
            // Profile join runs on the medal-joined rows
            stats.profile_fanout += (profile_hits.len() - 1) * medal_hits.len().max(1);
        }

        let medal_opts: Vec<Option<&RawMedal>> = if medal_hits.is_empty() {
            vec![None]
        } else {
            medal_hits.iter().copied().map(Some).collect()
        };
        for medal in medal_opts {
            if profile_hits.is_empty() {
                out.push(ReconciledRow {
                    exploded: row,
                    medal,
                    profile: None,
                });
            } else {
                for &profile in profile_hits {
                    out.push(ReconciledRow {
                        exploded: row,
                        medal,
                        profile: Some(profile),
                    });
                }
            }
        }
    }

    if stats.medal_fanout > 0 || stats.profile_fanout > 0 {
        log::debug!(
            "Join fan-out: {} extra rows from {} duplicate medal keys, {} extra rows from duplicate profiles",
            stats.medal_fanout,
            medal_index.duplicate_keys(),
            stats.profile_fanout
        );
    }
    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RawResult;

    fn medal(url: Option<&str>, slug: &str, event: &str, kind: &str) -> RawMedal {
        RawMedal {
            athlete_url: url.map(str::to_string),
            slug_game: Some(slug.into()),
            event_title: Some(event.into()),
            medal_type: Some(kind.into()),
        }
    }

    fn bio(url: &str, name: &str) -> RawAthlete {
        RawAthlete {
            athlete_url: Some(url.into()),
            athlete_full_name: Some(name.into()),
            ..Default::default()
        }
    }

    fn result() -> RawResult {
        RawResult {
            slug_game: Some("tokyo-2020".into()),
            event_title: Some("100m".into()),
            ..Default::default()
        }
    }

    fn exploded<'a>(result: &'a RawResult, url: Option<&str>) -> ExplodedResult<'a> {
        ExplodedResult {
            result,
            athlete_url: url.map(str::to_string),
            athlete_full_name: None,
        }
    }

    #[test]
    fn matches_on_all_three_key_parts() {
        let r = result();
        let rows = vec![exploded(&r, Some("/ath/1"))];
        let medals = vec![
            medal(Some("/ath/1"), "tokyo-2020", "200m", "GOLD"),
            medal(Some("/ath/1"), "rio-2016", "100m", "SILVER"),
            medal(Some("/ath/1"), "tokyo-2020", "100m", "BRONZE"),
        ];
        let (out, stats) = reconcile(&rows, &medals, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].medal.and_then(|m| m.medal_type.as_deref()),
            Some("BRONZE")
        );
        assert_eq!(stats.medal_matches, 1);
    }

    #[test]
    fn unmatched_row_kept_with_nulls() {
        let r = result();
        let rows = vec![exploded(&r, Some("/ath/2"))];
        let medals = vec![medal(Some("/ath/1"), "tokyo-2020", "100m", "GOLD")];
        let athletes = vec![bio("/ath/1", "Jane")];
        let (out, stats) = reconcile(&rows, &medals, &athletes);
        assert_eq!(out.len(), 1);
        assert!(out[0].medal.is_none());
        assert!(out[0].profile.is_none());
        assert_eq!(stats, ReconcileStats::default());
    }

    #[test]
    fn null_keys_never_match() {
        let r = RawResult {
            event_title: None,
            ..result()
        };
        let rows = vec![exploded(&r, None), exploded(&r, Some("/ath/1"))];
        let medals = vec![
            medal(None, "tokyo-2020", "100m", "GOLD"),
            RawMedal {
                event_title: None,
                ..medal(Some("/ath/1"), "tokyo-2020", "x", "GOLD")
            },
        ];
        let athletes = vec![RawAthlete::default()];
        let (out, _) = reconcile(&rows, &medals, &athletes);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.medal.is_none() && r.profile.is_none()));
    }

    #[test]
    fn duplicate_medal_keys_fan_out_in_order() {
        let r = result();
        let rows = vec![exploded(&r, Some("/ath/1"))];
        let medals = vec![
            medal(Some("/ath/1"), "tokyo-2020", "100m", "GOLD"),
            medal(Some("/ath/1"), "tokyo-2020", "100m", "SILVER"),
        ];
        let athletes = vec![bio("/ath/1", "Jane Doe")];
        let (out, stats) = reconcile(&rows, &medals, &athletes);
        let kinds: Vec<_> = out
            .iter()
            .map(|r| r.medal.and_then(|m| m.medal_type.as_deref()))
            .collect();
        assert_eq!(kinds, vec![Some("GOLD"), Some("SILVER")]);
        assert!(out.iter().all(|r| r.profile.is_some()));
        assert_eq!(stats.medal_fanout, 1);
        assert_eq!(stats.profile_fanout, 0);
    }

    #[test]
    fn duplicate_profiles_fan_out_after_medals() {
        let r = result();
        let rows = vec![exploded(&r, Some("/ath/1"))];
        let medals = vec![
            medal(Some("/ath/1"), "tokyo-2020", "100m", "GOLD"),
            medal(Some("/ath/1"), "tokyo-2020", "100m", "SILVER"),
        ];
        let athletes = vec![bio("/ath/1", "Jane Doe"), bio("/ath/1", "Jane D.")];
        let (out, stats) = reconcile(&rows, &medals, &athletes);
        assert_eq!(out.len(), 4);
        assert_eq!(stats.profile_fanout, 2);
        let names: Vec<_> = out
            .iter()
            .map(|r| r.profile.and_then(|p| p.athlete_full_name.as_deref()))
            .collect();
        assert_eq!(
            names,
            vec![Some("Jane Doe"), Some("Jane D."), Some("Jane Doe"), Some("Jane D.")]
        );
    }
}
