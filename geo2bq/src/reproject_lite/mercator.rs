//! Projection Web Mercator (EPSG:3857)
//!
//! Modèle sphérique sur le rayon équatorial WGS84.

use super::ellipsoid::WGS84;
use super::Geographic;

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let r = WGS84.a;
    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;
    Geographic::new(lon, lat)
}
