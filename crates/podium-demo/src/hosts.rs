//! Host catalog: edition metadata keyed by slug

use podium_prep::RawHost;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One edition as exposed to the API. Serialized as a `hosts.json` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInfo {
    #[serde(rename = "slug_game")]
    pub slug: String,
    pub year: Option<i32>,
    pub season: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// "Tokyo 2020" → "Tokyo"; single words are kept whole.
pub fn city_from_name(name: &str) -> &str {
    name.rsplit_once(' ').map_or(name, |(city, _)| city)
}

/// Editions in file order. A repeated slug replaces the earlier entry in
/// place.
#[derive(Debug, Clone, Default)]
pub struct HostCatalog {
    hosts: Vec<HostInfo>,
    by_slug: FxHashMap<String, usize>,
}

impl HostCatalog {
    pub fn from_rows(rows: &[RawHost]) -> Self {
        let mut catalog = Self::default();
        for row in rows {
            let Some(slug) = row.game_slug.clone() else {
                continue;
            };
            let info = HostInfo {
                year: row.game_year,
                season: row.game_season.clone(),
                city: row
                    .game_name
                    .as_deref()
                    .map(city_from_name)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
                country: row.game_location.clone(),
                name: row.game_name.clone(),
                start_date: row.game_start_date.clone(),
                end_date: row.game_end_date.clone(),
                slug: slug.clone(),
            };
            match catalog.by_slug.get(&slug) {
                Some(&i) => catalog.hosts[i] = info,
                None => {
                    catalog.by_slug.insert(slug, catalog.hosts.len());
                    catalog.hosts.push(info);
                }
            }
        }
        catalog
    }

    pub fn get(&self, slug: &str) -> Option<&HostInfo> {
        self.by_slug.get(slug).map(|&i| &self.hosts[i])
    }

    pub fn hosts(&self) -> &[HostInfo] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(slug: &str, name: &str, year: i32) -> RawHost {
        RawHost {
            game_slug: Some(slug.into()),
            game_name: Some(name.into()),
            game_year: Some(year),
            game_season: Some("Summer".into()),
            ..Default::default()
        }
    }

    #[test]
    fn city_drops_last_word() {
        assert_eq!(city_from_name("Tokyo 2020"), "Tokyo");
        assert_eq!(city_from_name("Rio de Janeiro 2016"), "Rio de Janeiro");
        assert_eq!(city_from_name("Athens"), "Athens");
    }

    #[test]
    fn catalog_lookup_and_order() {
        let rows = vec![
            host("tokyo-2020", "Tokyo 2020", 2021),
            RawHost::default(),
            host("rio-2016", "Rio 2016", 2016),
            host("tokyo-2020", "Tokyo 2020", 2020),
        ];
        let c = HostCatalog::from_rows(&rows);
        assert_eq!(c.len(), 2);
        assert_eq!(c.hosts()[0].slug, "tokyo-2020");
        assert_eq!(c.get("tokyo-2020").unwrap().year, Some(2020));
        assert_eq!(c.get("rio-2016").unwrap().city.as_deref(), Some("Rio"));
        assert!(c.get("paris-2024").is_none());
    }

    #[test]
    fn serializes_slug_as_slug_game() {
        let c = HostCatalog::from_rows(&[host("rio-2016", "Rio 2016", 2016)]);
        let json = serde_json::to_value(&c.hosts()[0]).unwrap();
        assert_eq!(json["slug_game"], "rio-2016");
        assert_eq!(json["city"], "Rio");
        assert!(json["end_date"].is_null());
    }
}
