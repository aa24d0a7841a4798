//! Row structs → Arrow RecordBatches

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::aggregate::CountryEditionSummary;
use crate::features::FeatureRow;
use crate::schema;
use crate::unify::UnifiedResult;

pub const BATCH_SIZE: usize = 64 * 1024;

/// Column-wise buffer for one processed table.
pub trait TableAccumulator: Default {
    type Row;

    fn schema() -> &'static Schema;
    fn push(&mut self, row: &Self::Row);
    fn len(&self) -> usize;
    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn batch(schema: &'static Schema, arrays: Vec<ArrayRef>) -> Result<RecordBatch, ArrowError> {
    RecordBatch::try_new(Arc::new(schema.clone()), arrays)
}

fn take<T>(v: &mut Vec<T>) -> Vec<T> {
    std::mem::take(v)
}

#[derive(Default)]
pub struct FullAccumulator {
    slug_game: Vec<Option<String>>,
    event_title: Vec<Option<String>>,
    discipline_title: Vec<Option<String>>,
    participant_type: Vec<Option<String>>,
    rank_position: Vec<Option<f64>>,
    athletes: Vec<Option<String>>,
    medal_type: Vec<Option<String>>,
    country_name: Vec<Option<String>>,
    country_code: Vec<Option<String>>,
    athlete_url: Vec<Option<String>>,
    athlete_full_name: Vec<Option<String>>,
    medal_type_medals: Vec<Option<String>>,
    athlete_full_name_profile: Vec<Option<String>>,
    games_participations: Vec<Option<i32>>,
    first_game: Vec<Option<String>>,
    athlete_year_birth: Vec<Option<i32>>,
    medal_type_final: Vec<Option<String>>,
    medal_flag: Vec<u8>,
}

impl TableAccumulator for FullAccumulator {
    type Row = UnifiedResult;

    fn schema() -> &'static Schema {
        schema::full()
    }

    fn push(&mut self, row: &UnifiedResult) {
        self.slug_game.push(row.slug_game.clone());
        self.event_title.push(row.event_title.clone());
        self.discipline_title.push(row.discipline_title.clone());
        self.participant_type.push(row.participant_type.clone());
        self.rank_position.push(row.rank_position);
        self.athletes.push(row.athletes.clone());
        self.medal_type.push(row.medal_type.clone());
        self.country_name.push(row.country_name.clone());
        self.country_code.push(row.country_code.clone());
        self.athlete_url.push(row.athlete_url.clone());
        self.athlete_full_name.push(row.athlete_full_name.clone());
        self.medal_type_medals.push(row.medal_type_medals.clone());
        self.athlete_full_name_profile
            .push(row.athlete_full_name_profile.clone());
        self.games_participations.push(row.games_participations);
        self.first_game.push(row.first_game.clone());
        self.athlete_year_birth.push(row.athlete_year_birth);
        self.medal_type_final.push(row.medal_type_final.clone());
        self.medal_flag.push(row.medal_flag);
    }

    fn len(&self) -> usize {
        self.medal_flag.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(take(&mut self.slug_game))),
            Arc::new(StringArray::from(take(&mut self.event_title))),
            Arc::new(StringArray::from(take(&mut self.discipline_title))),
            Arc::new(StringArray::from(take(&mut self.participant_type))),
            Arc::new(Float64Array::from(take(&mut self.rank_position))),
            Arc::new(StringArray::from(take(&mut self.athletes))),
            Arc::new(StringArray::from(take(&mut self.medal_type))),
            Arc::new(StringArray::from(take(&mut self.country_name))),
            Arc::new(StringArray::from(take(&mut self.country_code))),
            Arc::new(StringArray::from(take(&mut self.athlete_url))),
            Arc::new(StringArray::from(take(&mut self.athlete_full_name))),
            Arc::new(StringArray::from(take(&mut self.medal_type_medals))),
            Arc::new(StringArray::from(take(
                &mut self.athlete_full_name_profile,
            ))),
            Arc::new(Int32Array::from(take(&mut self.games_participations))),
            Arc::new(StringArray::from(take(&mut self.first_game))),
            Arc::new(Int32Array::from(take(&mut self.athlete_year_birth))),
            Arc::new(StringArray::from(take(&mut self.medal_type_final))),
            Arc::new(UInt8Array::from(take(&mut self.medal_flag))),
        ];
        batch(Self::schema(), arrays)
    }
}

#[derive(Default)]
pub struct SummaryAccumulator {
    country_name: Vec<Option<String>>,
    slug_game: Vec<Option<String>>,
    medals_total: Vec<i64>,
    athletes_unique: Vec<i64>,
    avg_rank: Vec<Option<f64>>,
}

impl SummaryAccumulator {
    fn push_fields(&mut self, country: &Option<String>, slug: &Option<String>, medals: i64, athletes: i64, rank: Option<f64>) {
        self.country_name.push(country.clone());
        self.slug_game.push(slug.clone());
        self.medals_total.push(medals);
        self.athletes_unique.push(athletes);
        self.avg_rank.push(rank);
    }

    fn take_arrays(&mut self) -> Vec<ArrayRef> {
        vec![
            Arc::new(StringArray::from(take(&mut self.country_name))),
            Arc::new(StringArray::from(take(&mut self.slug_game))),
            Arc::new(Int64Array::from(take(&mut self.medals_total))),
            Arc::new(Int64Array::from(take(&mut self.athletes_unique))),
            Arc::new(Float64Array::from(take(&mut self.avg_rank))),
        ]
    }
}

impl TableAccumulator for SummaryAccumulator {
    type Row = CountryEditionSummary;

    fn schema() -> &'static Schema {
        schema::summary()
    }

    fn push(&mut self, row: &CountryEditionSummary) {
        self.push_fields(
            &row.country_name,
            &row.slug_game,
            row.medals_total,
            row.athletes_unique,
            row.avg_rank,
        );
    }

    fn len(&self) -> usize {
        self.medals_total.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let arrays = self.take_arrays();
        batch(Self::schema(), arrays)
    }
}

#[derive(Default)]
pub struct FeatureAccumulator {
    base: SummaryAccumulator,
    medal_share: Vec<f64>,
    medals_total_lag_1: Vec<i64>,
    athletes_unique_lag_1: Vec<i64>,
}

impl TableAccumulator for FeatureAccumulator {
    type Row = FeatureRow;

    fn schema() -> &'static Schema {
        schema::features()
    }

    fn push(&mut self, row: &FeatureRow) {
        self.base.push_fields(
            &row.country_name,
            &row.slug_game,
            row.medals_total,
            row.athletes_unique,
            row.avg_rank,
        );
        self.medal_share.push(row.medal_share);
        self.medals_total_lag_1.push(row.medals_total_lag_1);
        self.athletes_unique_lag_1.push(row.athletes_unique_lag_1);
    }

    fn len(&self) -> usize {
        self.medal_share.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let mut arrays = self.base.take_arrays();
        arrays.push(Arc::new(Float64Array::from(take(&mut self.medal_share))));
        arrays.push(Arc::new(Int64Array::from(take(&mut self.medals_total_lag_1))));
        arrays.push(Arc::new(Int64Array::from(take(&mut self.athletes_unique_lag_1))));
        batch(Self::schema(), arrays)
    }
}
