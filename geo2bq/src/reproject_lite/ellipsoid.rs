//! Définitions des ellipsoïdes

/// Ellipsoïde de révolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Inverse de l'aplatissement
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        2.0 * f - f * f
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }
}

/// WGS84 (UTM, Web Mercator)
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6378137.0,
    inverse_flattening: 298.257223563,
};

/// GRS80 (RGF93 / Lambert 93)
pub const GRS80: Ellipsoid = Ellipsoid {
    a: 6378137.0,
    inverse_flattening: 298.257222101,
};
