//! Header resolution for inconsistently named spreadsheet columns.
//!
//! Source tables spell their headers with varying case, accents,
//! punctuation and the occasional typo ("Fecha ulTiiMo mantenimiento").
//! Resolution normalizes both sides and matches exact first, then by
//! substring, always in declared header order.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AppError, AppResult};

/// Punctuation replaced by a space before comparison
const PUNCTUATION: [char; 6] = [',', '.', ';', ':', '-', '_'];

/// Normalize text for header/alias comparison: trim, lowercase, strip
/// diacritics, map punctuation to spaces, collapse whitespace runs.
/// Idempotent: normalizing an already-normalized string is a no-op.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.trim().to_lowercase().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if PUNCTUATION.contains(&ch) {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The logical fields every equipment table must expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalField {
    Ficha,
    Modelo,
    Ubicacion,
    FechaUltimoMantenimiento,
}

impl LogicalField {
    /// Alias phrases recognized for this field, as they have appeared in
    /// the source spreadsheets over time.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            LogicalField::Ficha => &["ficha"],
            LogicalField::Modelo => &["modelo"],
            LogicalField::Ubicacion => &["location", "ubicacion", "ubicación"],
            LogicalField::FechaUltimoMantenimiento => &[
                "fecha ulTiiMo mantenimiento",
                "fecha ultimo mantenimiento",
                "fecha último mantenimiento",
                "fecha de ultimo mantenimiento",
                "fecha de último mantenimiento",
            ],
        }
    }
}

/// Column indices of the four logical fields within a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub ficha: usize,
    pub modelo: usize,
    pub ubicacion: usize,
    pub fecha: usize,
}

/// Find the column matching any of `aliases` among `headers`.
///
/// Two passes over the headers in their declared order: exact match of the
/// normalized header against a normalized alias, then a normalized header
/// that contains a normalized alias as a substring. The first header to
/// match wins in either pass.
pub fn resolve_column(headers: &[String], aliases: &[&str]) -> AppResult<usize> {
    let header_norms: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
    let alias_norms: Vec<String> = aliases.iter().map(|a| normalize(a)).collect();

    for (idx, header) in header_norms.iter().enumerate() {
        if alias_norms.iter().any(|alias| alias == header) {
            return Ok(idx);
        }
    }

    for (idx, header) in header_norms.iter().enumerate() {
        if alias_norms.iter().any(|alias| header.contains(alias.as_str())) {
            return Ok(idx);
        }
    }

    Err(AppError::ColumnNotFound {
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        headers: headers.to_vec(),
    })
}

/// Resolve all four logical fields at once. Fails on the first field with
/// no matching header; nothing downstream can run with a partial mapping.
pub fn resolve_columns(headers: &[String]) -> AppResult<ResolvedColumns> {
    Ok(ResolvedColumns {
        ficha: resolve_column(headers, LogicalField::Ficha.aliases())?,
        modelo: resolve_column(headers, LogicalField::Modelo.aliases())?,
        ubicacion: resolve_column(headers, LogicalField::Ubicacion.aliases())?,
        fecha: resolve_column(headers, LogicalField::FechaUltimoMantenimiento.aliases())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(hs: &[&str]) -> Vec<String> {
        hs.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_normalize_accents_and_punctuation() {
        assert_eq!(normalize("  Fecha último-mantenimiento. "), "fecha ultimo mantenimiento");
        assert_eq!(normalize("UBICACIÓN"), "ubicacion");
        assert_eq!(normalize("ficha_id"), "ficha id");
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("Fecha: Último  Mantenimiento");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_exact_match_with_accent_difference() {
        let hs = headers(&["Fecha último mantenimiento", "Ficha", "Modelo", "Ubicación"]);
        let idx = resolve_column(&hs, &["fecha ultimo mantenimiento"]).unwrap();
        assert_eq!(hs[idx], "Fecha último mantenimiento");
    }

    #[test]
    fn test_substring_fallback() {
        let hs = headers(&["Ficha", "Fecha de ultimo mantenimiento realizado"]);
        let idx = resolve_column(&hs, &["fecha de ultimo mantenimiento"]).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_exact_wins_over_substring() {
        // Second header matches exactly; first only by containment.
        let hs = headers(&["Modelo antiguo", "Modelo"]);
        assert_eq!(resolve_column(&hs, &["modelo"]).unwrap(), 1);
    }

    #[test]
    fn test_substring_tie_breaks_on_first_header() {
        let hs = headers(&["Ficha interna", "Ficha externa"]);
        assert_eq!(resolve_column(&hs, &["ficha"]).unwrap(), 0);
    }

    #[test]
    fn test_no_match_reports_aliases_and_headers() {
        let hs = headers(&["Equipo", "Sitio"]);
        let err = resolve_column(&hs, &["ficha"]).unwrap_err();
        match err {
            AppError::ColumnNotFound { aliases, headers } => {
                assert_eq!(aliases, vec!["ficha".to_string()]);
                assert_eq!(headers, vec!["Equipo".to_string(), "Sitio".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_all_columns() {
        let hs = headers(&[
            "Fecha ulTiiMo mantenimiento",
            "Ficha",
            "Modelo",
            "Location",
        ]);
        let cols = resolve_columns(&hs).unwrap();
        assert_eq!(cols.fecha, 0);
        assert_eq!(cols.ficha, 1);
        assert_eq!(cols.modelo, 2);
        assert_eq!(cols.ubicacion, 3);
    }

    #[test]
    fn test_resolve_columns_missing_field() {
        let hs = headers(&["Ficha", "Modelo", "Location"]);
        assert!(matches!(
            resolve_columns(&hs),
            Err(AppError::ColumnNotFound { .. })
        ));
    }
}
