//! Détection du système de coordonnées
//!
//! - GeoJSON : membre `crs` historique (`{"type":"name","properties":{"name":...}}`)
//! - Shapefile : contenu WKT du fichier `.prj`

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::types::Crs;

fn authority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)AUTHORITY\s*\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex")
    })
}

fn utm_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)UTM[_ ]zone[_ ](\d{1,2})([NS])").expect("valid regex"))
}

/// Interprète un nom de CRS (ex: `EPSG:3857`, `urn:ogc:def:crs:EPSG::2154`)
pub fn parse_crs_name(name: &str) -> Option<u32> {
    let name = name.trim();
    let upper = name.to_ascii_uppercase();

    if upper.ends_with("CRS84") || upper.ends_with("CRS:84") {
        return Some(4326);
    }

    if upper.starts_with("EPSG:") || upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
        // Le code est toujours le dernier segment (la version éventuelle est au milieu)
        return upper.rsplit(':').next()?.parse().ok();
    }

    None
}

/// Extrait le CRS du membre `crs` d'un document GeoJSON
///
/// L'absence de membre vaut WGS84 (RFC 7946).
pub fn from_geojson_member(member: Option<&Value>) -> Crs {
    let Some(member) = member else {
        return Crs::WGS84;
    };

    match member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
    {
        Some(name) => match parse_crs_name(name) {
            Some(code) => Crs::Epsg(code),
            None => Crs::Wkt(name.to_string()),
        },
        None if member.is_null() => Crs::WGS84,
        None => Crs::Undefined,
    }
}

/// Interprète le contenu WKT d'un fichier `.prj`
pub fn from_prj(wkt: &str) -> Crs {
    let wkt = wkt.trim();
    if wkt.is_empty() {
        return Crs::Undefined;
    }

    // En WKT1, l'autorité de l'objet racine est la dernière du texte
    if let Some(code) = authority_regex()
        .captures_iter(wkt)
        .last()
        .and_then(|c| c[1].parse().ok())
    {
        return Crs::Epsg(code);
    }

    let upper = wkt.to_ascii_uppercase();
    let is_wgs84 = upper.contains("WGS_1984") || upper.contains("WGS 84") || upper.contains("WGS84");

    if upper.starts_with("PROJCS") {
        if upper.contains("PSEUDO_MERCATOR")
            || upper.contains("PSEUDO-MERCATOR")
            || upper.contains("POPULAR_VISUALISATION")
            || upper.contains("MERCATOR_AUXILIARY_SPHERE")
        {
            return Crs::Epsg(3857);
        }
        if upper.contains("LAMBERT_93") || upper.contains("LAMBERT-93") {
            return Crs::Epsg(2154);
        }
        if is_wgs84 {
            if let Some(caps) = utm_regex().captures(wkt) {
                if let Ok(zone) = caps[1].parse::<u32>() {
                    if (1..=60).contains(&zone) {
                        let base = if caps[2].eq_ignore_ascii_case("S") { 32700 } else { 32600 };
                        return Crs::Epsg(base + zone);
                    }
                }
            }
        }
    } else if upper.starts_with("GEOGCS") && is_wgs84 {
        return Crs::WGS84;
    }

    Crs::Wkt(wkt.to_string())
}
