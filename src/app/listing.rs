//! Shelter listing fetcher
//!
//! Pages through the listing endpoint and turns each row into a
//! [`ShelterRecord`]. Only the row's own `PlaceID` is trusted as a place id,
//! and only when it is not a category id; everything else is left for the
//! resolver.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::client::BookingClient;
use crate::app::models::{CategoryIds, ShelterRecord};
use crate::constants::{booking, listing};
use crate::errors::FetchResult;

/// Pagination settings for the listing endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ListingConfig {
    /// Rows requested per page
    pub page_size: usize,
    /// Hard cap on the number of pages requested
    pub max_pages: usize,
    /// Result cap passed to the endpoint
    pub result_cap: u32,
    /// Delay between page requests
    pub page_delay: Duration,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: listing::PAGE_SIZE,
            max_pages: listing::MAX_PAGES,
            result_cap: listing::RESULT_CAP,
            page_delay: listing::PAGE_DELAY,
        }
    }
}

/// Raw listing row as the endpoint returns it
///
/// Numeric fields arrive as numbers or strings depending on the row, so they
/// are kept as raw JSON values and interpreted below.
#[derive(Debug, Default, Deserialize)]
struct PlaceRow {
    #[serde(rename = "Uri")]
    uri: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "PlaceID")]
    place_id: Option<Value>,
    #[serde(rename = "DoubleLat")]
    double_lat: Option<Value>,
    #[serde(rename = "DoubleLng")]
    double_lng: Option<Value>,
    #[serde(rename = "Lat")]
    lat: Option<Value>,
    #[serde(rename = "Lng")]
    lng: Option<Value>,
    #[serde(rename = "RegionName")]
    region_name: Option<String>,
}

/// Collects every shelter from the listing endpoint
#[derive(Debug, Clone)]
pub struct ListingFetcher {
    config: ListingConfig,
    categories: CategoryIds,
}

impl ListingFetcher {
    /// Create a fetcher with the given pagination settings and category ids
    pub fn new(config: ListingConfig, categories: CategoryIds) -> Self {
        Self { config, categories }
    }

    /// Fetch all listing pages
    ///
    /// Stops after an empty page, after a page shorter than the page size, or
    /// at the page cap. A failure on the first page is returned; a failure on
    /// a later page ends pagination with the rows collected so far.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the first page cannot be fetched or decoded
    pub async fn fetch_all(&self, client: &BookingClient) -> FetchResult<Vec<ShelterRecord>> {
        let mut shelters = Vec::new();

        for page in 1..=self.config.max_pages {
            let document = match client
                .places_page(page, self.config.page_size, self.config.result_cap)
                .await
            {
                Ok(document) => document,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    warn!(
                        "Listing page {} failed, keeping {} shelters from earlier pages: {}",
                        page,
                        shelters.len(),
                        e
                    );
                    break;
                }
            };

            let rows = page_rows(&document);
            debug!("Listing page {}: {} rows", page, rows.len());
            if rows.is_empty() {
                break;
            }

            shelters.extend(
                rows.iter()
                    .filter_map(|row| self.parse_row(row, |slug| client.shelter_url(slug))),
            );

            if rows.len() < self.config.page_size {
                break;
            }
            if page == self.config.max_pages {
                warn!(
                    "Stopped listing at the {} page cap; the endpoint kept returning full pages",
                    self.config.max_pages
                );
                break;
            }
            tokio::time::sleep(self.config.page_delay).await;
        }

        info!("Listing returned {} shelters", shelters.len());
        Ok(shelters)
    }

    /// Turn one listing row into a shelter record
    ///
    /// Rows without a slug are skipped. `shelter_url` maps the slug to the
    /// detail page URL.
    pub fn parse_row(
        &self,
        row: &Value,
        shelter_url: impl Fn(&str) -> String,
    ) -> Option<ShelterRecord> {
        let place = match PlaceRow::deserialize(row) {
            Ok(place) => place,
            Err(e) => {
                debug!("Skipping unreadable listing row: {}", e);
                return None;
            }
        };

        let slug = place
            .uri
            .as_deref()
            .map(|uri| uri.trim().trim_matches('/'))
            .filter(|slug| !slug.is_empty())?;

        let candidate_id = place
            .place_id
            .as_ref()
            .and_then(parse_place_id)
            .and_then(|id| self.categories.accept(id));

        let (latitude, longitude) = parse_coordinates(
            first_present(&place.double_lat, &place.lat),
            first_present(&place.double_lng, &place.lng),
        );

        let title = place
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| title_from_slug(slug));

        Some(ShelterRecord {
            title,
            url: shelter_url(slug),
            candidate_id,
            latitude,
            longitude,
            region: place.region_name.unwrap_or_default(),
        })
    }
}

/// Row list of a listing page; a missing list counts as an empty page
fn page_rows(document: &Value) -> &[Value] {
    document
        .get(booking::PLACES_LIST_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn first_present<'a>(primary: &'a Option<Value>, fallback: &'a Option<Value>) -> Option<&'a Value> {
    primary
        .as_ref()
        .filter(|value| !value.is_null())
        .or_else(|| fallback.as_ref().filter(|value| !value.is_null()))
}

/// Place ids come as numbers or numeric strings
fn parse_place_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Coordinates are numbers, numeric strings, or blank
///
/// If either value is present but unparsable, both are dropped.
fn parse_coordinates(lat: Option<&Value>, lng: Option<&Value>) -> (Option<f64>, Option<f64>) {
    match (parse_coordinate(lat), parse_coordinate(lng)) {
        (Ok(lat), Ok(lng)) => (lat, lng),
        _ => (None, None),
    }
}

fn parse_coordinate(value: Option<&Value>) -> Result<Option<f64>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number.as_f64().map(Some).ok_or(()),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text.trim().parse().map(Some).map_err(|_| ()),
        Some(_) => Err(()),
    }
}

/// `shelter-ved-skoven` -> `Shelter Ved Skoven`
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetcher() -> ListingFetcher {
        ListingFetcher::new(ListingConfig::default(), CategoryIds::default())
    }

    fn url(slug: &str) -> String {
        format!("https://book.naturstyrelsen.dk/sted/{}/", slug)
    }

    #[test]
    fn test_parse_full_row() {
        let row = json!({
            "Uri": " /shelter-ved-soen/ ",
            "Title": "Shelter ved søen",
            "PlaceID": 4711,
            "DoubleLat": 55.5,
            "DoubleLng": "12.25",
            "RegionName": "Sjælland"
        });
        let shelter = fetcher().parse_row(&row, url).unwrap();

        assert_eq!(shelter.url, "https://book.naturstyrelsen.dk/sted/shelter-ved-soen/");
        assert_eq!(shelter.title, "Shelter ved søen");
        assert_eq!(shelter.candidate_id, Some(4711));
        assert_eq!(shelter.coordinates(), Some((55.5, 12.25)));
        assert_eq!(shelter.region, "Sjælland");
    }

    #[test]
    fn test_category_place_id_discarded() {
        let row = json!({"Uri": "egeskoven", "PlaceID": "3012"});
        let shelter = fetcher().parse_row(&row, url).unwrap();
        assert_eq!(shelter.candidate_id, None);
    }

    #[test]
    fn test_unparsable_place_id_is_absent() {
        let row = json!({"Uri": "egeskoven", "PlaceID": "n/a"});
        assert_eq!(fetcher().parse_row(&row, url).unwrap().candidate_id, None);
    }

    #[test]
    fn test_row_without_uri_skipped() {
        assert!(fetcher().parse_row(&json!({"Title": "No slug"}), url).is_none());
        assert!(fetcher().parse_row(&json!({"Uri": " / "}), url).is_none());
    }

    #[test]
    fn test_coordinate_fallback_fields() {
        let row = json!({"Uri": "a", "Lat": "56.1", "Lng": 9.5});
        let shelter = fetcher().parse_row(&row, url).unwrap();
        assert_eq!(shelter.coordinates(), Some((56.1, 9.5)));
    }

    #[test]
    fn test_bad_coordinate_drops_both() {
        let row = json!({"Uri": "a", "DoubleLat": "north", "DoubleLng": 9.5});
        let shelter = fetcher().parse_row(&row, url).unwrap();
        assert_eq!(shelter.latitude, None);
        assert_eq!(shelter.longitude, None);
    }

    #[test]
    fn test_blank_coordinates_absent() {
        let row = json!({"Uri": "a", "DoubleLat": "", "DoubleLng": null});
        let shelter = fetcher().parse_row(&row, url).unwrap();
        assert_eq!(shelter.coordinates(), None);
    }

    #[test]
    fn test_title_fallback_from_slug() {
        let row = json!({"Uri": "shelter-ved-SKOVEN", "Title": null});
        let shelter = fetcher().parse_row(&row, url).unwrap();
        assert_eq!(shelter.title, "Shelter Ved Skoven");
        assert_eq!(shelter.region, "");
    }

    #[test]
    fn test_page_rows_missing_list() {
        assert!(page_rows(&json!({})).is_empty());
        assert!(page_rows(&json!({"BookingPlacesList": null})).is_empty());
        assert_eq!(page_rows(&json!({"BookingPlacesList": [{}, {}]})).len(), 2);
    }
}
