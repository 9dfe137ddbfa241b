use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend-assigned identifier of a holding.
///
/// Opaque to the client: the backend may send it as a JSON number or a
/// string, and it is always carried around as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HoldingId(String);

impl HoldingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HoldingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for HoldingId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for HoldingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for HoldingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => HoldingId(n.to_string()),
            RawId::Text(s) => HoldingId(s),
        })
    }
}

/// One recorded purchase of a coin, as returned by the backend.
///
/// The client keeps a read-only copy. Any valuation fields the backend
/// sends alongside are ignored; they are recomputed by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,

    /// Canonical coin identifier (e.g., "bitcoin")
    pub coin: String,

    /// Display ticker (e.g., "BTC")
    pub coin_symbol: String,

    /// Number of coins owned
    pub quantity: f64,

    /// Price of ONE coin at buy time, never the total spent
    pub buy_price: f64,

    /// Currency code the prices are denominated in (e.g., "php")
    pub currency: String,

    /// Latest market price attached by the backend.
    /// `None` when the backend could not price the coin.
    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Holding {
    /// Amount of money put into this holding: quantity × per-unit buy price.
    pub fn invested(&self) -> f64 {
        self.quantity * self.buy_price
    }
}

/// Creation payload sent to the backend.
///
/// `buy_price` is always a per-unit price, whichever entry mode the user
/// filled the form in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingPayload {
    pub coin: String,
    pub coin_symbol: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub currency: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Whether a holding is up, down or even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Gain,
    Loss,
    Flat,
}

/// A holding together with its derived valuation figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratedHolding {
    #[serde(flatten)]
    pub holding: Holding,

    /// quantity × buy_price
    pub total_invested: f64,

    /// quantity × current price
    pub current_value: f64,

    /// current_value − total_invested
    pub profit_loss: f64,

    /// profit_loss / total_invested × 100, or 0 when nothing was invested
    pub profit_loss_percentage: f64,

    pub trend: Trend,

    /// False when the backend sent no market price and the holding was
    /// valued at its buy price instead.
    pub price_available: bool,
}

/// Accepts RFC 3339 timestamps as well as the naive ISO timestamps some
/// backends emit (those are taken to be UTC).
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
}
