//! Canonical incident models shared by every view.

use serde::ser::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::reconcile::RawIncident;
use crate::temporal::LastUpdated;

// ---

/// Canonical incident record, built once per raw record per fetch.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Incident {
    // ---
    /// 1-based position in the current feed batch.
    pub id: u32,
    pub original_id: String,
    pub last_updated: LastUpdated,
    /// `last_updated` rendered for tables.
    pub last_updated_label: String,
    pub location: String,
    pub resource_summary: String,
    pub severity_level: u8,
    pub status: String,
    pub enriched: EnrichedOriginal,
}

impl Incident {
    /// Both coordinates are finite numbers.
    pub fn has_coordinates(&self) -> bool {
        self.enriched.lat.is_finite() && self.enriched.lng.is_finite()
    }
}

/// Personnel, ground vehicle, and aircraft counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResourceCounts {
    pub personnel: u32,
    pub ground: u32,
    pub air: u32,
}

/// Weather and fire-index readings. Absent values are `NaN`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct WeatherAttributes {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub pressure: f64,
    pub rain_24h: f64,
    pub fwi: f64,
    pub isi: f64,
    pub vpd_kpa: f64,
    pub altitude: f64,
}

/// Raw record plus the derived fields detail views read.
///
/// Serializes as one flat object: the raw keys first, overlaid by the
/// derived keys. Non-finite numbers serialize as `null`.
#[derive(Debug, Clone)]
pub struct EnrichedOriginal {
    // ---
    pub raw: RawIncident,
    pub lat: f64,
    pub lng: f64,
    pub actual: ResourceCounts,
    pub predicted: ResourceCounts,
    pub weather: WeatherAttributes,
    pub nature: Option<String>,
    pub region: Option<String>,
    pub sub_region: Option<String>,
    pub alert_source: Option<String>,
}

impl EnrichedOriginal {
    pub fn to_json(&self) -> Map<String, Value> {
        // ---
        let mut out = self.raw.clone();
        let w = &self.weather;
        let derived = json!({
            "lat": self.lat,
            "lng": self.lng,
            "man": self.actual.personnel,
            "terrain": self.actual.ground,
            "aerial": self.actual.air,
            "predicted_man": self.predicted.personnel,
            "predicted_terrain": self.predicted.ground,
            "predicted_aerial": self.predicted.air,
            "temperature": w.temperature,
            "humidity": w.humidity,
            "wind_speed": w.wind_speed,
            "wind_direction": w.wind_direction,
            "pressure": w.pressure,
            "rain_24h": w.rain_24h,
            "fwi": w.fwi,
            "isi": w.isi,
            "vpd_kpa": w.vpd_kpa,
            "altitude": w.altitude,
            "nature": self.nature,
            "region": self.region,
            "sub_region": self.sub_region,
            "alert_source": self.alert_source,
        });
        if let Value::Object(fields) = derived {
            out.extend(fields);
        }
        out
    }
}

impl Serialize for EnrichedOriginal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
