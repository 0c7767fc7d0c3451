//! Projection conique conforme de Lambert à deux parallèles (inverse)
//!
//! Paramétrée pour Lambert 93 (EPSG:2154) sur GRS80.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ellipsoid::GRS80;
use super::Geographic;

/// Paramètres d'une conique conforme sécante (angles en degrés)
struct ConformalConic {
    lon0: f64,
    lat0: f64,
    lat1: f64,
    lat2: f64,
    x0: f64,
    y0: f64,
}

const LAMBERT_93: ConformalConic = ConformalConic {
    lon0: 3.0,
    lat0: 46.5,
    lat1: 44.0,
    lat2: 49.0,
    x0: 700_000.0,
    y0: 6_600_000.0,
};

/// Latitude isométrique
fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let esin = e * lat.sin();
    ((FRAC_PI_4 + lat / 2.0).tan() * ((1.0 - esin) / (1.0 + esin)).powf(e / 2.0)).ln()
}

/// Latitude depuis la latitude isométrique (point fixe)
fn latitude_from_isometric(iso_lat: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso_lat.exp().atan() - FRAC_PI_2;
    for _ in 0..15 {
        let esin = e * lat.sin();
        let next =
            2.0 * (iso_lat.exp() * ((1.0 + esin) / (1.0 - esin)).powf(e / 2.0)).atan() - FRAC_PI_2;
        if (next - lat).abs() < 1e-12 {
            return next;
        }
        lat = next;
    }
    lat
}

impl ConformalConic {
    fn inverse(&self, x: f64, y: f64, a: f64, e2: f64) -> Geographic {
        let e = e2.sqrt();
        let (lat0, lat1, lat2) = (
            self.lat0.to_radians(),
            self.lat1.to_radians(),
            self.lat2.to_radians(),
        );

        // Grande normale aux parallèles standards
        let normal = |lat: f64| a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let (n1, n2) = (normal(lat1), normal(lat2));
        let (l1, l2) = (isometric_latitude(lat1, e), isometric_latitude(lat2, e));

        let n = ((n1 * lat1.cos()).ln() - (n2 * lat2.cos()).ln()) / (l2 - l1);
        let c = (n1 * lat1.cos() / n) * (n * l1).exp();
        let r0 = c * (-n * isometric_latitude(lat0, e)).exp();

        let dx = x - self.x0;
        let dy = r0 - (y - self.y0);
        let r = dx.hypot(dy).copysign(n);
        let gamma = (dx / dy).atan();

        let lat = latitude_from_isometric(-(r / c).ln() / n, e);
        Geographic::new(self.lon0.to_radians() + gamma / n, lat)
    }
}

/// Convertit Lambert 93 vers coordonnées géographiques
pub fn lambert93_to_geographic(x: f64, y: f64) -> Geographic {
    LAMBERT_93.inverse(x, y, GRS80.a, GRS80.e2())
}
