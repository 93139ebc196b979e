//! Banco de Mexico SIE series client.
//!
//! Serves the daily FIX exchange rate (pesos per US dollar) one calendar day
//! at a time. The series publishes on business days only; the resolver walks
//! dates backward through the [`RateSeries`] seam until it finds an
//! observation.
//! API documentation: https://www.banxico.org.mx/SieAPIRest/service/v1/doc

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::provider::default_client;

const BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1";
/// FIX exchange rate series, pesos per US dollar.
const SERIES_ID: &str = "SF43718";
const PROVIDER_ID: &str = "BANXICO";

/// One day's outcome while walking the series backward.
#[derive(Debug, Clone, PartialEq)]
pub enum DayObservation {
    /// The series has a published value for the day.
    Found(Decimal),
    /// Nothing published for the day (weekend or holiday). Keep walking.
    NotPublished,
}

/// Source of daily central-bank observations.
///
/// The resolver drives the day-walk through this seam; tests script outcomes
/// per date without touching the network.
#[async_trait]
pub trait RateSeries: Send + Sync {
    /// The observation for one calendar day, or an error for genuine
    /// provider failures. "Nothing published" is a normal outcome, not an
    /// error.
    async fn observation(&self, date: NaiveDate) -> Result<DayObservation, MarketDataError>;
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    bmx: Bmx,
}

#[derive(Debug, Deserialize)]
struct Bmx {
    #[serde(default)]
    series: Vec<Series>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    datos: Vec<Datum>,
}

#[derive(Debug, Deserialize)]
struct Datum {
    dato: String,
}

/// Parse one datum string from the series payload.
///
/// The series marks days without an estimate as "N/E"; that is the same
/// not-published case as an empty datos array.
fn parse_datum(raw: &str) -> Result<DayObservation, MarketDataError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("N/E") {
        return Ok(DayObservation::NotPublished);
    }
    trimmed
        .parse::<Decimal>()
        .map(DayObservation::Found)
        .map_err(|_| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("unparseable observation: {}", raw),
        })
}

/// Banco de Mexico SIE client.
pub struct BanxicoClient {
    client: Client,
    token: String,
}

impl BanxicoClient {
    /// Create a new client with the given Bmx-Token credential.
    pub fn new(token: String) -> Self {
        Self::with_client(default_client(), token)
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_client(client: Client, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl RateSeries for BanxicoClient {
    async fn observation(&self, date: NaiveDate) -> Result<DayObservation, MarketDataError> {
        let day = date.format("%Y-%m-%d").to_string();
        let url = format!("{}/series/{}/datos/{}/{}", BASE_URL, SERIES_ID, day, day);

        debug!("Fetching FIX observation for {}", day);

        let response = self
            .client
            .get(&url)
            .header("Bmx-Token", &self.token)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                message: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {}", e)
                },
            })?;

        let status = response.status();

        // Expected for non-business days; not an error.
        if status == StatusCode::NOT_FOUND {
            return Ok(DayObservation::NotPublished);
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let payload: SeriesResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidResponse {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("failed to parse series response: {}", e),
                })?;

        match payload
            .bmx
            .series
            .first()
            .and_then(|series| series.datos.first())
        {
            Some(datum) => parse_datum(&datum.dato),
            None => Ok(DayObservation::NotPublished),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_datum_value() {
        let observation = parse_datum("17.5020").unwrap();
        assert_eq!(observation, DayObservation::Found(dec!(17.5020)));
    }

    #[test]
    fn test_parse_datum_not_estimated() {
        assert!(matches!(parse_datum("N/E"), Ok(DayObservation::NotPublished)));
        assert!(matches!(parse_datum(" n/e "), Ok(DayObservation::NotPublished)));
    }

    #[test]
    fn test_parse_datum_garbage() {
        assert!(parse_datum("not-a-number").is_err());
    }

    #[test]
    fn test_series_response_parsing() {
        let json = r#"{
            "bmx": {
                "series": [
                    {
                        "idSerie": "SF43718",
                        "titulo": "Tipo de cambio pesos por dolar E.U.A.",
                        "datos": [
                            { "fecha": "17/06/2025", "dato": "18.8525" }
                        ]
                    }
                ]
            }
        }"#;

        let response: SeriesResponse = serde_json::from_str(json).unwrap();
        let datum = &response.bmx.series[0].datos[0];
        assert_eq!(datum.dato, "18.8525");
    }

    #[test]
    fn test_series_response_empty_datos() {
        let json = r#"{"bmx": {"series": [{"idSerie": "SF43718", "titulo": "FIX"}]}}"#;

        let response: SeriesResponse = serde_json::from_str(json).unwrap();
        assert!(response.bmx.series[0].datos.is_empty());
    }
}
