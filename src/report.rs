//! Alert report content.
//!
//! Builds the fixed, ordered sections an external document renderer lays
//! out for one incident. Resource counts are resolved from the raw record
//! through the same reconciliation chain the normalizer uses, so a count the
//! feed never reported renders as `N/A` instead of `0`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Incident;
use crate::reconcile::{self, Attribute};

// ---

/// Rendering for any value the feed did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub label: String,
    pub value: String,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub filename: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    /// Every line in order, rendered as `Label: value`.
    pub fn lines(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter().map(ToString::to_string))
            .collect()
    }
}

/// `<product>_Alert_<id>.<ext>`
pub fn report_filename(product: &str, id: u32, ext: &str) -> String {
    format!("{}_Alert_{}.{}", product, id, ext)
}

/// Compile the report for `incident`.
pub fn compile(incident: &Incident, product: &str, generated_at: DateTime<Utc>) -> Report {
    // ---
    let e = &incident.enriched;
    let w = &e.weather;

    let coordinates = if incident.has_coordinates() {
        format!("{:.4}, {:.4}", e.lat, e.lng)
    } else {
        NOT_AVAILABLE.to_string()
    };

    // Direction is only meaningful next to a speed
    let wind = match (w.wind_speed.is_finite(), w.wind_direction.is_finite()) {
        (true, true) => format!(
            "{} (Dir: {})",
            fixed(w.wind_speed, 1, " km/h"),
            fixed(w.wind_direction, 0, "°")
        ),
        _ => fixed(w.wind_speed, 1, " km/h"),
    };

    let sections = vec![
        section(
            "Header",
            vec![line("Generated", generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())],
        ),
        section(
            "Alert Information",
            vec![
                line("Alert ID", incident.id.to_string()),
                line("Original ID", incident.original_id.clone()),
                line("Status", incident.status.clone()),
                line("Location", incident.location.clone()),
                line("Last updated", incident.last_updated_label.clone()),
                line("Coordinates", coordinates),
            ],
        ),
        section(
            "Fire Details",
            vec![
                line("Fire type", text_or_na(e.nature.as_deref())),
                line("Region", text_or_na(e.region.as_deref())),
                line("Altitude", fixed(w.altitude, 2, " m")),
            ],
        ),
        section(
            "Weather Information",
            vec![
                line("Temperature", fixed(w.temperature, 1, " °C")),
                line("Pressure", fixed(w.pressure, 1, " hPa")),
                line("Relative humidity", fixed(w.humidity, 1, "%")),
                line("Wind", wind),
                line("Rain (24h)", fixed(w.rain_24h, 1, " mm")),
                line("FWI", fixed(w.fwi, 1, "")),
                line("ISI", fixed(w.isi, 1, "")),
                line("VPD", fixed(w.vpd_kpa, 2, " kPa")),
            ],
        ),
        section(
            "Real-time Resources",
            resource_lines(
                incident,
                [Attribute::ActualPersonnel, Attribute::ActualGround, Attribute::ActualAir],
            ),
        ),
        section(
            "Predicted Resources",
            resource_lines(
                incident,
                [Attribute::PredictedPersonnel, Attribute::PredictedGround, Attribute::PredictedAir],
            ),
        ),
    ];

    Report {
        title: format!("{} - Alert Report", product),
        filename: report_filename(product, incident.id, "pdf"),
        sections,
    }
}

fn resource_lines(incident: &Incident, [personnel, ground, air]: [Attribute; 3]) -> Vec<ReportLine> {
    // ---
    let raw = &incident.enriched.raw;
    let count = |attr| {
        reconcile::count(raw, attr).map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string())
    };
    vec![
        line("Firefighters", count(personnel)),
        line("Vehicles", count(ground)),
        line("Aerial", count(air)),
    ]
}

/// Fixed precision plus unit, or `N/A` for non-finite values.
fn fixed(value: f64, precision: usize, unit: &str) -> String {
    if value.is_finite() {
        format!("{:.*}{}", precision, value, unit)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn text_or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn line(label: &str, value: String) -> ReportLine {
    ReportLine {
        label: label.to_string(),
        value,
    }
}

fn section(title: &str, lines: Vec<ReportLine>) -> ReportSection {
    ReportSection {
        title: title.to_string(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::normalize::normalize;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn incident(value: Value) -> Incident {
        normalize(value.as_object().unwrap(), 7)
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
    }

    fn value_of(report: &Report, label: &str) -> String {
        report
            .sections
            .iter()
            .flat_map(|s| &s.lines)
            .find(|l| l.label == label)
            .map(|l| l.value.clone())
            .unwrap()
    }

    #[test]
    fn test_absent_temperature_is_na() {
        // ---
        let report = compile(&incident(json!({})), "FireHawk", generated());
        assert!(report.lines().contains(&"Temperature: N/A".to_string()));
    }

    #[test]
    fn test_section_order_and_filename() {
        // ---
        let report = compile(&incident(json!({})), "FireHawk", generated());
        let titles: Vec<_> = report.sections.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![
                "Header",
                "Alert Information",
                "Fire Details",
                "Weather Information",
                "Real-time Resources",
                "Predicted Resources",
            ]
        );
        assert_eq!(report.filename, "FireHawk_Alert_7.pdf");
        assert_eq!(report.title, "FireHawk - Alert Report");
        assert_eq!(report.lines()[0], "Generated: 2025-03-26 18:45:00 UTC");
    }

    #[test]
    fn test_values_use_fixed_precision() {
        // ---
        let report = compile(
            &incident(json!({
                "lat": 41.15, "lon": -8.61,
                "temp": 28.46, "humidade": 35, "vento": "12.26", "direcao_vento": 271.6,
                "pressao": 1013.2, "chuva_24h": 0, "FWI": 33.333, "isi": 9.95,
                "VPD_kPa": 2.346, "ALTITUDEMEDIA": 512.3, "natureza": "Mato",
            })),
            "FireHawk",
            generated(),
        );

        assert_eq!(value_of(&report, "Coordinates"), "41.1500, -8.6100");
        assert_eq!(value_of(&report, "Temperature"), "28.5 °C");
        assert_eq!(value_of(&report, "Relative humidity"), "35.0%");
        assert_eq!(value_of(&report, "Wind"), "12.3 km/h (Dir: 272°)");
        assert_eq!(value_of(&report, "Pressure"), "1013.2 hPa");
        assert_eq!(value_of(&report, "Rain (24h)"), "0.0 mm");
        assert_eq!(value_of(&report, "FWI"), "33.3");
        assert_eq!(value_of(&report, "VPD"), "2.35 kPa");
        assert_eq!(value_of(&report, "Altitude"), "512.30 m");
        assert_eq!(value_of(&report, "Fire type"), "Mato");
    }

    #[test]
    fn test_resources_distinguish_zero_from_absent() {
        // ---
        let report = compile(
            &incident(json!({"Real_Homens": 0, "Real_Terrestres": "5", "Prev_Homens": 14})),
            "FireHawk",
            generated(),
        );
        let real = &report.sections[4].lines;
        let predicted = &report.sections[5].lines;

        assert_eq!(real[0].to_string(), "Firefighters: 0");
        assert_eq!(real[1].to_string(), "Vehicles: 5");
        assert_eq!(real[2].to_string(), "Aerial: N/A");
        assert_eq!(predicted[0].to_string(), "Firefighters: 14");
        assert_eq!(predicted[1].to_string(), "Vehicles: N/A");
    }

    #[test]
    fn test_missing_coordinates_and_identity() {
        // ---
        let report = compile(&incident(json!({"Distrito": "Faro"})), "FireHawk", generated());

        assert_eq!(value_of(&report, "Coordinates"), "N/A");
        assert_eq!(value_of(&report, "Location"), "Faro");
        assert_eq!(value_of(&report, "Region"), "Faro");
        assert_eq!(value_of(&report, "Last updated"), "N/A");
        assert_eq!(value_of(&report, "Wind"), "N/A");
    }

    #[test]
    fn test_wind_direction_needs_speed() {
        // ---
        let dir_only = compile(&incident(json!({"direcao_vento": 271.6})), "FireHawk", generated());
        assert_eq!(value_of(&dir_only, "Wind"), "N/A");

        let speed_only = compile(&incident(json!({"vento": 8})), "FireHawk", generated());
        assert_eq!(value_of(&speed_only, "Wind"), "8.0 km/h");
    }
}
