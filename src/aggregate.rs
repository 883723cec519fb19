//! Feed-level aggregation: recency window and ongoing-incident overlay.

use serde::Serialize;
use serde_json::Value;

use crate::models::Incident;
use crate::normalize;
use crate::reconcile::{self, Attribute};
use crate::status;
use crate::temporal::LastUpdated;

// ---

/// Default number of most recent incidents shown in the table and map.
pub const TABLE_WINDOW: usize = 20;

/// Everything the views need from one feed fetch.
#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    /// Every normalized record, in feed order.
    pub incidents: Vec<Incident>,
    /// Newest first, at most `window` entries.
    pub table: Vec<Incident>,
    /// Ongoing incidents from the whole feed, newest first.
    pub ongoing: Vec<Incident>,
}

impl FeedView {
    pub fn find(&self, id: u32) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }
}

/// Normalize `feed`, order it by recency and derive the table and overlay.
///
/// Sorting is stable, so incidents with equal instants keep feed order.
pub fn aggregate(feed: &[Value], window: usize) -> FeedView {
    // ---
    let incidents = normalize::normalize_feed(feed);

    let mut sorted = incidents.clone();
    sorted.sort_by(|a, b| LastUpdated::newest_first(&a.last_updated, &b.last_updated));

    let ongoing = sorted.iter().filter(|i| is_ongoing(i)).cloned().collect();
    sorted.truncate(window);

    FeedView {
        incidents,
        table: sorted,
        ongoing,
    }
}

/// Finite coordinates, and either flagged active or reporting a status other
/// than closed.
pub fn is_ongoing(incident: &Incident) -> bool {
    // ---
    if !incident.has_coordinates() {
        return false;
    }
    let raw = &incident.enriched.raw;
    let active = reconcile::flag(raw, Attribute::Active).unwrap_or(false);
    let open = reconcile::text(raw, Attribute::Status).is_some_and(|s| !status::is_closed(&s));
    active || open
}
