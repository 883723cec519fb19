//! Raw record → canonical [`Incident`].
//!
//! Normalization is total: every input, including an empty object or a
//! non-object array entry, produces a well-formed incident. Absent values
//! resolve to documented defaults (`0`, `NaN`, `"Unknown"`, `"N/A"`) and
//! nothing here can fail.

use serde_json::Value;
use tracing::debug;

use crate::models::{EnrichedOriginal, Incident, ResourceCounts, WeatherAttributes};
use crate::reconcile::{self, Attribute, RawIncident};
use crate::status;
use crate::temporal::{self, LastUpdated};

// ---

/// Fallback for missing location and status.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder `original_id` when no identifier field is usable.
pub const MISSING_ID: &str = "N/A";

/// Letter tagging the personnel count in `resource_summary` ("M" for man-power).
pub const PERSONNEL_TAG: char = 'M';

/// Normalize a whole feed, assigning ids by feed position.
pub fn normalize_feed(feed: &[Value]) -> Vec<Incident> {
    // ---
    let empty = RawIncident::new();
    feed.iter()
        .enumerate()
        .map(|(i, item)| {
            let raw = item.as_object().unwrap_or_else(|| {
                debug!("Feed entry {} is not an object, treating as empty: {}", i, item);
                &empty
            });
            normalize(raw, i + 1)
        })
        .collect()
}

/// Normalize one raw record found at 1-based `position` in its batch.
pub fn normalize(raw: &RawIncident, position: usize) -> Incident {
    // ---
    let last_updated = resolve_last_updated(raw);

    let actual = resolve_counts(
        raw,
        [Attribute::ActualPersonnel, Attribute::ActualGround, Attribute::ActualAir],
    );
    let predicted = resolve_counts(
        raw,
        [Attribute::PredictedPersonnel, Attribute::PredictedGround, Attribute::PredictedAir],
    );

    let reported_status = reconcile::text(raw, Attribute::Status);
    let severity_level = reported_status.as_deref().map_or(0, status::severity_level);

    let enriched = EnrichedOriginal {
        raw: raw.clone(),
        lat: coordinate(raw, Attribute::Latitude),
        lng: coordinate(raw, Attribute::Longitude),
        actual,
        predicted,
        weather: resolve_weather(raw),
        nature: reconcile::text(raw, Attribute::Nature),
        region: reconcile::text(raw, Attribute::Local)
            .or_else(|| reconcile::text(raw, Attribute::District)),
        sub_region: reconcile::text(raw, Attribute::Municipality),
        alert_source: reconcile::text(raw, Attribute::Id),
    };

    Incident {
        id: u32::try_from(position).unwrap_or(u32::MAX),
        original_id: reconcile::text(raw, Attribute::Id).unwrap_or_else(|| MISSING_ID.to_string()),
        last_updated,
        last_updated_label: last_updated.to_string(),
        location: resolve_location(raw),
        resource_summary: resource_summary(&actual),
        severity_level,
        status: reported_status.unwrap_or_else(|| UNKNOWN.to_string()),
        enriched,
    }
}

/// `"<personnel> M | <ground> T | <air> A"`.
pub fn resource_summary(counts: &ResourceCounts) -> String {
    format!(
        "{} {} | {} T | {} A",
        counts.personnel, PERSONNEL_TAG, counts.ground, counts.air
    )
}

/// Separate day-first date/time first, then the combined legacy timestamp.
fn resolve_last_updated(raw: &RawIncident) -> LastUpdated {
    // ---
    let split = match (
        reconcile::text(raw, Attribute::Date),
        reconcile::text(raw, Attribute::Time),
    ) {
        (Some(date), Some(time)) => temporal::from_date_and_time(&date, &time),
        _ => LastUpdated::Unparseable,
    };
    if split != LastUpdated::Unparseable {
        return split;
    }
    reconcile::text(raw, Attribute::CombinedTimestamp)
        .map_or(LastUpdated::Unparseable, |ts| temporal::from_combined(&ts))
}

fn resolve_counts(raw: &RawIncident, [personnel, ground, air]: [Attribute; 3]) -> ResourceCounts {
    // ---
    ResourceCounts {
        personnel: reconcile::count(raw, personnel).unwrap_or(0),
        ground: reconcile::count(raw, ground).unwrap_or(0),
        air: reconcile::count(raw, air).unwrap_or(0),
    }
}

fn resolve_weather(raw: &RawIncident) -> WeatherAttributes {
    // ---
    let n = |attr| reconcile::number(raw, attr).unwrap_or(f64::NAN);
    WeatherAttributes {
        temperature: n(Attribute::Temperature),
        humidity: n(Attribute::Humidity),
        wind_speed: n(Attribute::WindSpeed),
        wind_direction: n(Attribute::WindDirection),
        pressure: n(Attribute::Pressure),
        rain_24h: n(Attribute::Rain24h),
        fwi: n(Attribute::Fwi),
        isi: n(Attribute::Isi),
        vpd_kpa: n(Attribute::Vpd),
        altitude: n(Attribute::Altitude),
    }
}

fn coordinate(raw: &RawIncident, attr: Attribute) -> f64 {
    reconcile::number(raw, attr).unwrap_or(f64::NAN)
}

/// `local` → "district - municipality" → district → municipality → region → "Unknown".
fn resolve_location(raw: &RawIncident) -> String {
    // ---
    if let Some(local) = reconcile::text(raw, Attribute::Local) {
        return local;
    }
    match (
        reconcile::text(raw, Attribute::District),
        reconcile::text(raw, Attribute::Municipality),
    ) {
        (Some(district), Some(municipality)) => format!("{} - {}", district, municipality),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => {
            reconcile::text(raw, Attribute::Region).unwrap_or_else(|| UNKNOWN.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn raw(value: Value) -> RawIncident {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pipeline_record() {
        // ---
        let r = raw(json!({"data": "10-03-2024", "hora": "14:30", "status": "Ativo", "Real_Homens": "12"}));
        let incident = normalize(&r, 1);

        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(incident.severity_level, 2);
        assert_eq!(incident.last_updated, LastUpdated::At(expected));
        assert_eq!(incident.last_updated_label, "10/03/2024, 14:30");
        assert_eq!(incident.enriched.actual.personnel, 12);
        assert_eq!(incident.resource_summary, "12 M | 0 T | 0 A");
    }

    #[test]
    fn test_empty_record_defaults() {
        // ---
        let incident = normalize(&RawIncident::new(), 1);

        assert_eq!(incident.location, "Unknown");
        assert_eq!(incident.status, "Unknown");
        assert_eq!(incident.severity_level, 0);
        assert_eq!(incident.original_id, MISSING_ID);
        assert_eq!(incident.last_updated, LastUpdated::Unparseable);
        assert!(incident.enriched.lat.is_nan());
        assert!(incident.enriched.lng.is_nan());
        assert_eq!(incident.enriched.actual, ResourceCounts::default());
        assert_eq!(incident.enriched.predicted, ResourceCounts::default());
        assert!(incident.enriched.weather.temperature.is_nan());
        assert!(!incident.has_coordinates());
    }

    #[test]
    fn test_location_precedence() {
        // ---
        let both = raw(json!({"Distrito": "Porto", "Concelho": "Gondomar"}));
        assert_eq!(normalize(&both, 1).location, "Porto - Gondomar");

        let local = raw(json!({"local": "Valongo", "Distrito": "Porto", "Concelho": "Gondomar"}));
        assert_eq!(normalize(&local, 1).location, "Valongo");

        let district = raw(json!({"Distrito": "Braga"}));
        assert_eq!(normalize(&district, 1).location, "Braga");

        let municipality = raw(json!({"Concelho": "Mafra"}));
        assert_eq!(normalize(&municipality, 1).location, "Mafra");

        let region = raw(json!({"Localizacao": "Serra da Estrela"}));
        assert_eq!(normalize(&region, 1).location, "Serra da Estrela");
    }

    #[test]
    fn test_legacy_record() {
        // ---
        let r = raw(json!({
            "NCCO": 2024010001,
            "Data_Atualizacao": "2024-07-02 09:15:00",
            "Estado": "Vigilância",
            "Latitude": "40.2",
            "Longitude": "-7.9",
            "Operacionais_Man": 40,
            "Meios_Terrestres": "11",
            "Meios_Aereos": 2,
            "TEMPERATURA": 31.4,
            "HUMIDADERELATIVA": "22",
        }));
        let incident = normalize(&r, 3);

        assert_eq!(incident.id, 3);
        assert_eq!(incident.original_id, "2024010001");
        assert_eq!(incident.severity_level, 3);
        assert_eq!(incident.resource_summary, "40 M | 11 T | 2 A");
        assert_eq!(incident.enriched.lat, 40.2);
        assert_eq!(incident.enriched.lng, -7.9);
        assert_eq!(incident.enriched.weather.temperature, 31.4);
        assert_eq!(incident.enriched.weather.humidity, 22.0);
        assert!(incident.has_coordinates());
    }

    #[test]
    fn test_predicted_counts_and_renamed_fields() {
        // ---
        let r = raw(json!({
            "ID_Incidente": "ABC-1",
            "Previsto_Operacionais_Man": "25",
            "Prev_Terrestres": 6.2,
            "Previsto_Meios_Aereos": "n/a",
            "lat": 41.1,
            "lng": -8.6,
        }));
        let incident = normalize(&r, 1);

        assert_eq!(incident.original_id, "ABC-1");
        assert_eq!(
            incident.enriched.predicted,
            ResourceCounts { personnel: 25, ground: 6, air: 0 }
        );
        assert_eq!(incident.enriched.lng, -8.6);
    }

    #[test]
    fn test_bad_split_date_falls_back_to_combined() {
        // ---
        let r = raw(json!({"data": "??", "hora": "10:00", "Data_Atualizacao": "2023-08-01 10:00:00"}));
        assert!(matches!(normalize(&r, 1).last_updated, LastUpdated::At(_)));
    }

    #[test]
    fn test_enriched_serializes_raw_and_derived() {
        // ---
        let r = raw(json!({"Real_Homens": "12", "extra": "kept"}));
        let value = serde_json::to_value(normalize(&r, 1)).unwrap();
        let enriched = &value["enriched"];

        assert_eq!(enriched["extra"], "kept");
        assert_eq!(enriched["Real_Homens"], "12");
        assert_eq!(enriched["man"], 12);
        assert!(enriched["lat"].is_null());
        assert!(value["last_updated"].is_null());
    }

    #[test]
    fn test_enriched_derived_keys() {
        // ---
        let value = serde_json::to_value(normalize(&raw(json!({})), 1)).unwrap();
        let enriched = value["enriched"].as_object().unwrap();

        let mut keys: Vec<&str> = enriched.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = vec![
            "lat", "lng", "man", "terrain", "aerial", "predicted_man", "predicted_terrain",
            "predicted_aerial", "temperature", "humidity", "wind_speed", "wind_direction",
            "pressure", "rain_24h", "fwi", "isi", "vpd_kpa", "altitude", "nature", "region",
            "sub_region", "alert_source",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_feed_is_pure_and_positional() {
        // ---
        let feed = vec![
            json!({"id": "a", "status": "Ativo"}),
            json!("not an object"),
            json!({"id": "c"}),
        ];
        let first = normalize_feed(&feed);
        let second = normalize_feed(&feed);

        let ids: Vec<_> = first.iter().map(|i| (i.id, i.original_id.clone())).collect();
        assert_eq!(
            ids,
            vec![(1, "a".to_string()), (2, "N/A".to_string()), (3, "c".to_string())]
        );
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
