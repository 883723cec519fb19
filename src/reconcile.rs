//! Field reconciliation across upstream schema generations.
//!
//! The incident feed has been produced by three successive pipelines, each
//! with its own key names for the same logical attribute. Every generation is
//! modelled as a named mapping from [`Attribute`] to source keys, and lookups
//! walk the generations in [`PRECEDENCE`] order (newest pipeline first,
//! legacy last). The normalizer and the report compiler both resolve values
//! through this module so they can never disagree.

use serde_json::{Map, Value};

// ---

/// A raw feed record: a flat object whose key set depends on the generation.
pub type RawIncident = Map<String, Value>;

/// Logical attributes the rest of the service asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Id,
    Date,
    Time,
    CombinedTimestamp,
    Status,
    Active,
    Local,
    District,
    Municipality,
    Region,
    Latitude,
    Longitude,
    Nature,
    ActualPersonnel,
    ActualGround,
    ActualAir,
    PredictedPersonnel,
    PredictedGround,
    PredictedAir,
    Temperature,
    Humidity,
    WindSpeed,
    WindDirection,
    Pressure,
    Rain24h,
    Fwi,
    Isi,
    Vpd,
    Altitude,
}

/// Upstream schema generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Current pipeline output (`data`/`hora`, `Real_*`, `Prev_*`, lowercase weather).
    Pipeline,
    /// Ad-hoc renamed fields introduced between the legacy export and the pipeline.
    Renamed,
    /// Portuguese legacy export (`Data_Atualizacao`, `Estado`, upper-case weather).
    Legacy,
}

/// Fixed lookup order. The first generation holding a usable value wins.
pub const PRECEDENCE: [Generation; 3] = [Generation::Pipeline, Generation::Renamed, Generation::Legacy];

impl Generation {
    /// Source keys this generation uses for `attr`, in lookup order.
    pub fn keys(self, attr: Attribute) -> &'static [&'static str] {
        // ---
        use Attribute::*;
        match self {
            Generation::Pipeline => match attr {
                Id => &["id"],
                Date => &["data"],
                Time => &["hora"],
                Status => &["status"],
                Local => &["local"],
                Latitude => &["lat"],
                Longitude => &["lon"],
                Nature => &["natureza"],
                ActualPersonnel => &["Real_Homens"],
                ActualGround => &["Real_Terrestres"],
                ActualAir => &["Real_Aereos"],
                PredictedPersonnel => &["Prev_Homens"],
                PredictedGround => &["Prev_Terrestres"],
                PredictedAir => &["Prev_Aereos"],
                Temperature => &["temp"],
                Humidity => &["humidade"],
                WindSpeed => &["vento"],
                WindDirection => &["direcao_vento"],
                Pressure => &["pressao"],
                Rain24h => &["chuva_24h"],
                Fwi => &["fwi"],
                Isi => &["isi"],
                Vpd => &["vpd_kpa"],
                Altitude => &["altitude"],
                CombinedTimestamp | Active | District | Municipality | Region => &[],
            },
            Generation::Renamed => match attr {
                Id => &["ID_Incidente"],
                Active => &["active"],
                Region => &["regiao"],
                Longitude => &["lng"],
                ActualPersonnel => &["Real_Operacionais_Man"],
                ActualGround => &["Real_Meios_Terrestres"],
                ActualAir => &["Real_Meios_Aereos"],
                PredictedPersonnel => &["Previsto_Operacionais_Man"],
                PredictedGround => &["Previsto_Meios_Terrestres"],
                PredictedAir => &["Previsto_Meios_Aereos"],
                Vpd => &["vpd"],
                _ => &[],
            },
            Generation::Legacy => match attr {
                Id => &["NCCO"],
                CombinedTimestamp => &["Data_Atualizacao"],
                Status => &["Estado"],
                District => &["Distrito", "DISTRITO"],
                Municipality => &["Concelho"],
                Region => &["Localizacao"],
                Latitude => &["Latitude", "LAT"],
                Longitude => &["Longitude", "LON"],
                Nature => &["Natureza"],
                ActualPersonnel => &["Operacionais_Man"],
                ActualGround => &["Meios_Terrestres"],
                ActualAir => &["Meios_Aereos"],
                Temperature => &["TEMPERATURA"],
                Humidity => &["HUMIDADERELATIVA"],
                WindSpeed => &["VENTOINTENSIDADE"],
                Rain24h => &["CHUVA_24H"],
                Fwi => &["FWI"],
                Isi => &["ISI"],
                Vpd => &["VPD_kPa"],
                Altitude => &["ALTITUDEMEDIA"],
                _ => &[],
            },
        }
    }
}

/// All candidate keys for `attr` across generations, in precedence order.
pub fn candidates(attr: Attribute) -> impl Iterator<Item = &'static str> {
    PRECEDENCE.into_iter().flat_map(move |g| g.keys(attr).iter().copied())
}

/// First candidate holding a non-empty string or a number, as text.
pub fn text(raw: &RawIncident, attr: Attribute) -> Option<String> {
    // ---
    candidates(attr).find_map(|key| match raw.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First candidate that parses as a finite number.
///
/// Empty or non-numeric strings count as absent and fall through to the next
/// candidate rather than resolving to zero.
pub fn number(raw: &RawIncident, attr: Attribute) -> Option<f64> {
    candidates(attr).find_map(|key| raw.get(key).and_then(as_number))
}

/// First candidate usable as a non-negative resource count.
///
/// Fractional model output is rounded to the nearest unit; negative values
/// are treated as absent.
pub fn count(raw: &RawIncident, attr: Attribute) -> Option<u32> {
    // ---
    candidates(attr).find_map(|key| {
        let n = raw.get(key).and_then(as_number)?;
        (n >= 0.0 && n <= f64::from(u32::MAX)).then(|| n.round() as u32)
    })
}

/// First candidate that is a boolean, or a `"true"`/`"false"` string.
pub fn flag(raw: &RawIncident, attr: Attribute) -> Option<bool> {
    // ---
    candidates(attr).find_map(|key| match raw.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    // ---
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawIncident {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_newest_generation_wins() {
        // ---
        let r = raw(json!({"status": "Ativo", "Estado": "Conclusão"}));
        assert_eq!(text(&r, Attribute::Status).as_deref(), Some("Ativo"));
    }

    #[test]
    fn test_empty_string_falls_through() {
        // ---
        let r = raw(json!({"status": "", "Estado": "Vigilância"}));
        assert_eq!(text(&r, Attribute::Status).as_deref(), Some("Vigilância"));
    }

    #[test]
    fn test_numeric_id_becomes_text() {
        // ---
        let r = raw(json!({"NCCO": 2024130012345_u64}));
        assert_eq!(text(&r, Attribute::Id).as_deref(), Some("2024130012345"));
    }

    #[test]
    fn test_non_numeric_falls_through_not_zero() {
        // ---
        let r = raw(json!({"Real_Homens": "abc", "Operacionais_Man": "7"}));
        assert_eq!(count(&r, Attribute::ActualPersonnel), Some(7));

        let r = raw(json!({"Real_Homens": ""}));
        assert_eq!(count(&r, Attribute::ActualPersonnel), None);
    }

    #[test]
    fn test_zero_is_a_real_value() {
        // ---
        let r = raw(json!({"Real_Aereos": 0, "Meios_Aereos": 4}));
        assert_eq!(count(&r, Attribute::ActualAir), Some(0));
    }

    #[test]
    fn test_counts_round_and_reject_negatives() {
        // ---
        let r = raw(json!({"Prev_Homens": 11.6, "Prev_Terrestres": -2, "Previsto_Meios_Terrestres": "3"}));
        assert_eq!(count(&r, Attribute::PredictedPersonnel), Some(12));
        assert_eq!(count(&r, Attribute::PredictedGround), Some(3));
    }

    #[test]
    fn test_number_parses_strings_and_skips_non_finite() {
        // ---
        let r = raw(json!({"lat": "NaN", "Latitude": " 41.15 "}));
        assert_eq!(number(&r, Attribute::Latitude), Some(41.15));
    }

    #[test]
    fn test_flag() {
        // ---
        assert_eq!(flag(&raw(json!({"active": true})), Attribute::Active), Some(true));
        assert_eq!(flag(&raw(json!({"active": "FALSE"})), Attribute::Active), Some(false));
        assert_eq!(flag(&raw(json!({"active": 1})), Attribute::Active), None);
    }

    #[test]
    fn test_candidates_follow_precedence() {
        // ---
        let keys: Vec<_> = candidates(Attribute::Longitude).collect();
        assert_eq!(keys, vec!["lon", "lng", "Longitude", "LON"]);
    }
}
