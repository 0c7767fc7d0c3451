//! Configuration du système
//!
//! Lue depuis l'environnement (après chargement éventuel d'un `.env`).

use std::time::Duration;

use anyhow::{Context, Result};

/// URL par défaut de l'API BigQuery
pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com";

/// Intervalle par défaut entre deux interrogations d'un job
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Configuration de l'accès à BigQuery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// Racine de l'API (surchargeable pour un émulateur)
    pub api_url: String,

    /// Localisation des jobs (ex: `EU`, `US`) ; None = choix du serveur
    pub location: Option<String>,

    /// Intervalle d'interrogation des jobs en cours
    pub poll_interval: Duration,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            location: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WarehouseConfig {
    /// Charge la configuration depuis les variables d'environnement
    ///
    /// - `GEO2BQ_API_URL`
    /// - `GEO2BQ_LOCATION`
    /// - `GEO2BQ_POLL_INTERVAL_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Variante testable de `from_env`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_interval = match non_empty("GEO2BQ_POLL_INTERVAL_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .with_context(|| format!("Invalid GEO2BQ_POLL_INTERVAL_MS: {}", ms))?,
            ),
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            api_url: non_empty("GEO2BQ_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            location: non_empty("GEO2BQ_LOCATION"),
            poll_interval,
        })
    }
}
