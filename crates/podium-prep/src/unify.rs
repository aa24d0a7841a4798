//! Record unifier: the canonical full result table

use serde::{Deserialize, Serialize};

use crate::reconcile::ReconciledRow;

/// One athlete in one event of one edition, with its medal outcome.
///
/// Field order is the column order of `olympic_full`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedResult {
    pub slug_game: Option<String>,
    pub event_title: Option<String>,
    pub discipline_title: Option<String>,
    pub participant_type: Option<String>,
    pub rank_position: Option<f64>,
    pub athletes: Option<String>,
    pub medal_type: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub athlete_url: Option<String>,
    pub athlete_full_name: Option<String>,
    pub medal_type_medals: Option<String>,
    pub athlete_full_name_profile: Option<String>,
    pub games_participations: Option<i32>,
    pub first_game: Option<String>,
    pub athlete_year_birth: Option<i32>,
    pub medal_type_final: Option<String>,
    pub medal_flag: u8,
}

/// Numeric rank, or `None` for empty and non-numeric values ("DNF", "=3").
pub fn parse_rank(raw: Option<&str>) -> Option<f64> {
    let v = raw?.trim().parse::<f64>().ok()?;
    (!v.is_nan()).then_some(v)
}

/// Result-sourced medal first, then the medals table.
pub fn final_medal(from_result: Option<&str>, from_medals: Option<&str>) -> Option<String> {
    from_result.or(from_medals).map(str::to_string)
}

impl From<&ReconciledRow<'_>> for UnifiedResult {
    fn from(row: &ReconciledRow<'_>) -> Self {
        let r = row.exploded.result;
        let medal_type_medals = row.medal.and_then(|m| m.medal_type.clone());
        let medal_type_final = final_medal(r.medal_type.as_deref(), medal_type_medals.as_deref());
        let medal_flag = u8::from(medal_type_final.is_some());
        let profile = row.profile;

        Self {
            slug_game: r.slug_game.clone(),
            event_title: r.event_title.clone(),
            discipline_title: r.discipline_title.clone(),
            participant_type: r.participant_type.clone(),
            rank_position: parse_rank(r.rank_position.as_deref()),
            athletes: r.athletes.clone(),
            medal_type: r.medal_type.clone(),
            country_name: r.country_name.clone(),
            country_code: r.country_code.clone(),
            athlete_url: row.exploded.athlete_url.clone(),
            athlete_full_name: row.exploded.athlete_full_name.clone(),
            medal_type_medals,
            athlete_full_name_profile: profile.and_then(|p| p.athlete_full_name.clone()),
            games_participations: profile.and_then(|p| p.games_participations),
            first_game: profile.and_then(|p| p.first_game.clone()),
            athlete_year_birth: profile.and_then(|p| p.athlete_year_birth),
            medal_type_final,
            medal_flag,
        }
    }
}

/// Build the full table. No rows are filtered here.
pub fn unify(rows: &[ReconciledRow<'_>]) -> Vec<UnifiedResult> {
    rows.iter().map(UnifiedResult::from).collect()
}
