//! Data models for Shelter Finder
//!
//! This module defines the core data structures shared by the listing
//! fetcher, the place id resolver, the filters and the report writer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::booking;

/// Identifier values the booking site uses for shelter categories
///
/// A category id is never a real place id. Treating one as a place id makes
/// every availability lookup for that shelter silently wrong, so every
/// component that accepts an id checks it against this set first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIds(BTreeSet<u64>);

impl CategoryIds {
    /// Create a category set from explicit values
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Whether `id` is a known category id
    pub fn contains(&self, id: u64) -> bool {
        self.0.contains(&id)
    }

    /// Keep `id` only if it can be a real place id
    pub fn accept(&self, id: u64) -> Option<u64> {
        (!self.contains(id)).then_some(id)
    }

    /// Iterate over the category ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }
}

impl Default for CategoryIds {
    fn default() -> Self {
        Self::new(booking::CATEGORY_IDS)
    }
}

/// A bookable shelter as collected from the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    /// Display title
    pub title: String,
    /// Canonical detail page URL, unique per shelter
    pub url: String,
    /// Place id, if the listing carried a trustworthy one or it was resolved later
    pub candidate_id: Option<u64>,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
    /// Region name from the listing, or the matched preset key; possibly empty
    pub region: String,
}

impl ShelterRecord {
    /// Both coordinates, if the listing provided them
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// The place id, if present and not a category id
    pub fn place_id(&self, categories: &CategoryIds) -> Option<u64> {
        self.candidate_id.and_then(|id| categories.accept(id))
    }

    /// Whether the record still needs its place id resolved
    pub fn needs_resolution(&self, categories: &CategoryIds) -> bool {
        self.place_id(categories).is_none()
    }
}

/// One row of the availability report
///
/// Field order is the CSV column order: coordinates first so mapping tools
/// pick them up without configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableShelter {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub region: String,
    pub name: String,
    pub url: String,
    pub place_id: u64,
}

impl AvailableShelter {
    /// Build a report row for a shelter found available under `place_id`
    pub fn new(record: &ShelterRecord, place_id: u64) -> Self {
        Self {
            lat: record.latitude,
            lng: record.longitude,
            region: record.region.clone(),
            name: record.title.clone(),
            url: record.url.clone(),
            place_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(candidate_id: Option<u64>) -> ShelterRecord {
        ShelterRecord {
            title: "Shelter ved Skovsøen".to_string(),
            url: "https://book.naturstyrelsen.dk/sted/shelter-ved-skovsoeen/".to_string(),
            candidate_id,
            latitude: Some(55.1),
            longitude: Some(12.0),
            region: String::new(),
        }
    }

    #[test]
    fn test_default_category_ids() {
        let categories = CategoryIds::default();
        assert!(categories.contains(3012));
        assert!(categories.contains(3031));
        assert!(categories.contains(3091));
        assert!(!categories.contains(4711));
        assert_eq!(categories.iter().collect::<Vec<_>>(), vec![3012, 3031, 3091]);
    }

    #[test]
    fn test_category_candidate_is_not_a_place_id() {
        let categories = CategoryIds::default();
        assert_eq!(record(Some(3012)).place_id(&categories), None);
        assert!(record(Some(3012)).needs_resolution(&categories));
        assert!(record(None).needs_resolution(&categories));
        assert_eq!(record(Some(4711)).place_id(&categories), Some(4711));
        assert!(!record(Some(4711)).needs_resolution(&categories));
    }

    #[test]
    fn test_coordinates_require_both_values() {
        let mut shelter = record(None);
        assert_eq!(shelter.coordinates(), Some((55.1, 12.0)));
        shelter.longitude = None;
        assert_eq!(shelter.coordinates(), None);
    }

    #[test]
    fn test_available_shelter_from_record() {
        let row = AvailableShelter::new(&record(Some(4711)), 4711);
        assert_eq!(row.name, "Shelter ved Skovsøen");
        assert_eq!(row.lat, Some(55.1));
        assert_eq!(row.place_id, 4711);
    }
}
