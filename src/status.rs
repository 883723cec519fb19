//! Status vocabulary mapping.
//!
//! Upstream feeds report incident status as free text from a closed set of
//! Portuguese labels. Classification is an exact match; anything else is
//! level 0.

/// Label used by every upstream generation for a concluded incident.
pub const CLOSED_LABEL: &str = "Conclusão";

/// Severity level for a status label, from 0 (unclassified) to 4 (closed).
pub fn severity_level(status: &str) -> u8 {
    // ---
    match status {
        "Despacho de 1º Alerta" | "Despacho" => 1,
        "Em Resolução" | "Em Curso" | "Ativo" | "Chegada ao TO" => 2,
        "Vigilância" => 3,
        CLOSED_LABEL => 4,
        _ => 0,
    }
}

/// Case-insensitive check against [`CLOSED_LABEL`], for membership filters
/// such as the ongoing-incident overlay.
pub fn is_closed(status: &str) -> bool {
    status.trim().to_lowercase() == CLOSED_LABEL.to_lowercase()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_known_labels() {
        // ---
        assert_eq!(severity_level("Despacho de 1º Alerta"), 1);
        assert_eq!(severity_level("Despacho"), 1);
        assert_eq!(severity_level("Em Resolução"), 2);
        assert_eq!(severity_level("Em Curso"), 2);
        assert_eq!(severity_level("Ativo"), 2);
        assert_eq!(severity_level("Chegada ao TO"), 2);
        assert_eq!(severity_level("Vigilância"), 3);
        assert_eq!(severity_level("Conclusão"), 4);
    }

    #[test]
    fn test_unknown_and_empty_are_zero() {
        // ---
        assert_eq!(severity_level(""), 0);
        assert_eq!(severity_level("Unknown"), 0);
        // Exact match only
        assert_eq!(severity_level("ativo"), 0);
    }

    #[test]
    fn test_is_closed_ignores_case() {
        // ---
        assert!(is_closed("Conclusão"));
        assert!(is_closed("CONCLUSÃO"));
        assert!(is_closed(" conclusão "));
        assert!(!is_closed("Ativo"));
    }
}
