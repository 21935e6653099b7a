//! In-memory shelter filters
//!
//! Both filters are pure: they take the listing and return the shelters
//! that survive, without touching the network.

use crate::app::models::ShelterRecord;
use crate::app::regions::RegionCatalog;

/// Keep shelters whose title contains `needle`, ignoring case
///
/// A blank needle keeps everything.
pub fn filter_by_title(shelters: Vec<ShelterRecord>, needle: &str) -> Vec<ShelterRecord> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return shelters;
    }
    shelters
        .into_iter()
        .filter(|shelter| shelter.title.to_lowercase().contains(&needle))
        .collect()
}

/// Keep shelters inside any of the given region presets
///
/// Shelters without coordinates are dropped. A shelter with an empty region
/// gets the key of the first preset it matched. Keys not in the catalog are
/// ignored; an empty key list keeps everything.
pub fn filter_by_regions(
    shelters: Vec<ShelterRecord>,
    catalog: &RegionCatalog,
    keys: &[&str],
) -> Vec<ShelterRecord> {
    if keys.is_empty() {
        return shelters;
    }
    let presets: Vec<_> = keys.iter().filter_map(|key| catalog.get(key)).collect();

    shelters
        .into_iter()
        .filter_map(|mut shelter| {
            let (latitude, longitude) = shelter.coordinates()?;
            let preset = presets
                .iter()
                .find(|preset| preset.contains(latitude, longitude))?;
            if shelter.region.is_empty() {
                shelter.region = preset.name.clone();
            }
            Some(shelter)
        })
        .collect()
}
