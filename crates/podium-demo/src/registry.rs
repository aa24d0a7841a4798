//! Deduplicating athlete registry built in one scan of the full table

use podium_prep::UnifiedResult;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// `reference_year - birth_year` for a positive birth year.
pub fn compute_age(birth_year: Option<i32>, reference_year: i32) -> Option<i32> {
    birth_year.filter(|&y| y > 0).map(|y| reference_year - y)
}

/// One `athletes.json` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteRecord {
    pub id: u32,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub country: Option<String>,
    pub games_participations: Option<i32>,
    pub first_game: Option<String>,
    pub profile_url: Option<String>,
}

/// Athletes keyed by profile URL, falling back to full name.
///
/// The first row seen for a key creates the record; later rows only fill
/// nationality and age when those are still missing.
#[derive(Debug, Default)]
pub struct AthleteRegistry {
    records: Vec<AthleteRecord>,
    ids: FxHashMap<String, usize>,
    reference_year: i32,
}

impl AthleteRegistry {
    pub fn new(reference_year: i32) -> Self {
        Self {
            reference_year,
            ..Self::default()
        }
    }

    /// Register `row`'s athlete. Returns its id, or `None` when the row has
    /// neither a profile URL nor a name.
    pub fn observe(&mut self, row: &UnifiedResult) -> Option<u32> {
        let key = row.athlete_url.as_deref().or(row.athlete_full_name.as_deref())?;
        let age = compute_age(row.athlete_year_birth, self.reference_year);

        if let Some(&i) = self.ids.get(key) {
            let record = &mut self.records[i];
            if record.nationality.is_none() && row.country_name.is_some() {
                record.nationality = row.country_name.clone();
                record.country = row.country_name.clone();
            }
            if record.age.is_none() {
                record.age = age;
            }
            return Some(record.id);
        }

        let id = self.records.len() as u32 + 1;
        self.ids.insert(key.to_string(), self.records.len());
        self.records.push(AthleteRecord {
            id,
            name: row.athlete_full_name.clone(),
            gender: None,
            age,
            nationality: row.country_name.clone(),
            country: row.country_name.clone(),
            games_participations: row.games_participations.filter(|&g| g >= 0),
            first_game: row.first_game.clone(),
            profile_url: row.athlete_url.clone(),
        });
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by id.
    pub fn into_records(self) -> Vec<AthleteRecord> {
        self.records
    }
}
