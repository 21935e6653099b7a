//! Availability checks against the bookings endpoint
//!
//! The bookings endpoint returns the booked dates around an anchor date. A
//! shelter is available for a stay when none of the nights of the stay are
//! booked.
//!
//! The anchor is always the first night. Whether the endpoint's answer covers
//! nights that spill into the following month is not known; stays crossing a
//! month boundary are checked against whatever the endpoint returns for the
//! first night's anchor.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde_json::Value;
use tracing::debug;

use crate::app::client::BookingClient;
use crate::constants::{availability, booking};
use crate::errors::FetchResult;

/// Outcome of checking one shelter for one stay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityCheck {
    /// Nights of the stay, ISO formatted
    pub required: Vec<String>,
    /// Required nights that are booked
    pub booked_hits: Vec<String>,
    /// Size of the booked set the endpoint returned
    pub booked_count: usize,
}

impl AvailabilityCheck {
    /// Compare the nights of a stay against a booked set
    pub fn evaluate(required: Vec<String>, booked: &BTreeSet<String>) -> Self {
        let booked_hits = required
            .iter()
            .filter(|date| booked.contains(date.as_str()))
            .cloned()
            .collect();
        Self {
            required,
            booked_hits,
            booked_count: booked.len(),
        }
    }

    /// Whether every night of the stay is free
    pub fn is_available(&self) -> bool {
        self.booked_hits.is_empty()
    }
}

/// The nights of a stay starting at `start`, as ISO dates
///
/// Returns `nights` dates: the start date and each following night.
pub fn required_dates(start: NaiveDate, nights: u32) -> Vec<String> {
    (0..u64::from(nights))
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect()
}

/// Booked date strings from a bookings document
pub fn booked_dates(document: &Value) -> BTreeSet<String> {
    document
        .get(booking::BOOKING_DATES_KEY)
        .and_then(Value::as_array)
        .map(|dates| {
            dates
                .iter()
                .filter_map(|date| match date {
                    Value::String(text) if !text.is_empty() => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Queries booked dates and decides availability
#[derive(Debug, Clone)]
pub struct AvailabilityProber {
    check_delay: Duration,
}

impl AvailabilityProber {
    /// Create a prober that sleeps `check_delay` before each request
    pub fn new(check_delay: Duration) -> Self {
        Self { check_delay }
    }

    /// Fetch the booked dates the endpoint reports around `anchor`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the request or decoding fails
    pub async fn fetch_booked_dates(
        &self,
        client: &BookingClient,
        place_id: u64,
        anchor: NaiveDate,
    ) -> FetchResult<BTreeSet<String>> {
        tokio::time::sleep(self.check_delay).await;
        let document = client.bookings(place_id, anchor).await?;
        let booked = booked_dates(&document);
        debug!(
            "place_id={} anchor={} booked_count={}",
            place_id,
            anchor,
            booked.len()
        );
        Ok(booked)
    }

    /// Check whether a place is free for `nights` nights from `start`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the booked dates cannot be fetched
    pub async fn check(
        &self,
        client: &BookingClient,
        place_id: u64,
        start: NaiveDate,
        nights: u32,
    ) -> FetchResult<AvailabilityCheck> {
        let booked = self.fetch_booked_dates(client, place_id, start).await?;
        Ok(AvailabilityCheck::evaluate(
            required_dates(start, nights),
            &booked,
        ))
    }
}

impl Default for AvailabilityProber {
    fn default() -> Self {
        Self::new(availability::CHECK_DELAY)
    }
}
