//! Arrow schemas of the processed tables
//!
//! Field names double as CSV headers, so both renditions share one layout.

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema};

/// `olympic_full`: one row per athlete per event per edition.
pub static FULL: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        // === Result ===
        Field::new("slug_game", DataType::Utf8, true),
        Field::new("event_title", DataType::Utf8, true),
        Field::new("discipline_title", DataType::Utf8, true),
        Field::new("participant_type", DataType::Utf8, true),
        Field::new("rank_position", DataType::Float64, true),
        Field::new("athletes", DataType::Utf8, true),
        Field::new("medal_type", DataType::Utf8, true),
        Field::new("country_name", DataType::Utf8, true),
        Field::new("country_code", DataType::Utf8, true),
        // === Athlete identity ===
        Field::new("athlete_url", DataType::Utf8, true),
        Field::new("athlete_full_name", DataType::Utf8, true),
        // === Medals table ===
        Field::new("medal_type_medals", DataType::Utf8, true),
        // === Athlete profile ===
        Field::new("athlete_full_name_profile", DataType::Utf8, true),
        Field::new("games_participations", DataType::Int32, true),
        Field::new("first_game", DataType::Utf8, true),
        Field::new("athlete_year_birth", DataType::Int32, true),
        // === Derived ===
        Field::new("medal_type_final", DataType::Utf8, true),
        Field::new("medal_flag", DataType::UInt8, false),
    ]))
});

/// `country_year_summary`
pub static SUMMARY: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(Schema::new(summary_fields())));

/// `country_features`: summary columns plus share and lag features.
pub static FEATURES: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    let mut fields = summary_fields();
    fields.extend([
        Field::new("medal_share", DataType::Float64, false),
        Field::new("medals_total_lag_1", DataType::Int64, false),
        Field::new("athletes_unique_lag_1", DataType::Int64, false),
    ]);
    Arc::new(Schema::new(fields))
});

fn summary_fields() -> Vec<Field> {
    vec![
        Field::new("country_name", DataType::Utf8, true),
        Field::new("slug_game", DataType::Utf8, true),
        Field::new("medals_total", DataType::Int64, false),
        Field::new("athletes_unique", DataType::Int64, false),
        Field::new("avg_rank", DataType::Float64, true),
    ]
}

pub fn full() -> &'static Schema {
    &FULL
}

pub fn summary() -> &'static Schema {
    &SUMMARY
}

pub fn features() -> &'static Schema {
    &FEATURES
}

/// Column names in schema order.
pub fn column_names(schema: &Schema) -> Vec<&str> {
    schema.fields().iter().map(|f| f.name().as_str()).collect()
}
