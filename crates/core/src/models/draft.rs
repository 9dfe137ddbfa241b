use serde::{Deserialize, Serialize};

use crate::errors::{FormField, InputRejected, ValidationErrors};

use super::coin::CoinSelection;
use super::holding::HoldingPayload;

/// Currency new drafts start in.
pub const DEFAULT_CURRENCY: &str = "php";

/// Which price figure the user types in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryMode {
    /// "I know the price per coin": total spent is derived
    #[default]
    PerUnit,
    /// "I know what I spent in total": price per coin is derived
    TotalSpent,
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryMode::PerUnit => write!(f, "perUnit"),
            EntryMode::TotalSpent => write!(f, "totalSpent"),
        }
    }
}

/// Numeric inputs of the add-holding form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountField {
    Quantity,
    BuyPrice,
    TotalSpent,
}

impl AmountField {
    pub fn form_field(self) -> FormField {
        match self {
            AmountField::Quantity => FormField::Quantity,
            AmountField::BuyPrice => FormField::BuyPrice,
            AmountField::TotalSpent => FormField::TotalSpent,
        }
    }
}

/// The price half of a draft. The variant decides which figure the user
/// owns and which one is computed; the derived one is only ever written
/// by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum PriceEntry {
    PerUnit {
        buy_price: Option<f64>,
        /// derived: quantity × buy_price
        total_spent: Option<f64>,
    },
    TotalSpent {
        total_spent: Option<f64>,
        /// derived: total_spent / quantity
        buy_price: Option<f64>,
    },
}

impl PriceEntry {
    /// Empty entry in the given mode.
    pub fn empty(mode: EntryMode) -> Self {
        match mode {
            EntryMode::PerUnit => PriceEntry::PerUnit {
                buy_price: None,
                total_spent: None,
            },
            EntryMode::TotalSpent => PriceEntry::TotalSpent {
                total_spent: None,
                buy_price: None,
            },
        }
    }

    pub fn mode(&self) -> EntryMode {
        match self {
            PriceEntry::PerUnit { .. } => EntryMode::PerUnit,
            PriceEntry::TotalSpent { .. } => EntryMode::TotalSpent,
        }
    }

    /// Per-unit price, typed or derived.
    pub fn buy_price(&self) -> Option<f64> {
        match *self {
            PriceEntry::PerUnit { buy_price, .. } | PriceEntry::TotalSpent { buy_price, .. } => {
                buy_price
            }
        }
    }

    /// Total spent, typed or derived.
    pub fn total_spent(&self) -> Option<f64> {
        match *self {
            PriceEntry::PerUnit { total_spent, .. } | PriceEntry::TotalSpent { total_spent, .. } => {
                total_spent
            }
        }
    }

    /// The field computed from the others in this mode.
    pub fn derived_field(&self) -> AmountField {
        match self {
            PriceEntry::PerUnit { .. } => AmountField::TotalSpent,
            PriceEntry::TotalSpent { .. } => AmountField::BuyPrice,
        }
    }
}

impl Default for PriceEntry {
    fn default() -> Self {
        PriceEntry::empty(EntryMode::default())
    }
}

/// Transient add-holding form state.
///
/// Lives only while the form is open; it is never persisted and has no
/// tie to the portfolio store until it is normalized into a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub coin: Option<CoinSelection>,
    pub quantity: Option<f64>,
    pub entry: PriceEntry,
    pub currency: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub errors: ValidationErrors,
}

impl EntryDraft {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            coin: None,
            quantity: None,
            entry: PriceEntry::default(),
            currency: currency.into().to_lowercase(),
            notes: None,
            errors: ValidationErrors::new(),
        }
    }

    /// Rebuild a per-unit draft from a payload that was already normalized.
    pub fn from_payload(payload: &HoldingPayload) -> Self {
        Self {
            coin: Some(CoinSelection {
                id: payload.coin.clone(),
                symbol: payload.coin_symbol.clone(),
            }),
            quantity: Some(payload.quantity),
            entry: PriceEntry::PerUnit {
                buy_price: Some(payload.buy_price),
                total_spent: Some(payload.quantity * payload.buy_price),
            },
            currency: payload.currency.clone(),
            notes: payload.notes.clone(),
            errors: ValidationErrors::new(),
        }
    }

    pub fn mode(&self) -> EntryMode {
        self.entry.mode()
    }

    pub fn buy_price(&self) -> Option<f64> {
        self.entry.buy_price()
    }

    pub fn total_spent(&self) -> Option<f64> {
        self.entry.total_spent()
    }

    /// Record the coin picked from the catalog.
    pub fn select_coin(&mut self, coin: CoinSelection) {
        self.coin = Some(coin);
        self.errors.remove(FormField::Coin);
    }

    /// Notes are free text; blank notes are kept as typed.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    /// Back to a blank per-unit form, keeping the currency.
    pub fn reset(&mut self) {
        let currency = std::mem::take(&mut self.currency);
        *self = Self::new(currency);
    }

    /// Display text of the derived figure (2 decimals), or empty.
    pub fn derived_display(&self) -> String {
        let value = match self.entry.derived_field() {
            AmountField::TotalSpent => self.total_spent(),
            _ => self.buy_price(),
        };
        value.map(format_amount).unwrap_or_default()
    }
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

/// Parse what the user typed into an amount field.
///
/// Blank input is an empty value. Negative, non-numeric and non-finite
/// input is refused so it never enters a draft.
pub fn parse_amount(raw: &str) -> Result<Option<f64>, InputRejected> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(|_| InputRejected::NotANumber)?;
    if !value.is_finite() {
        return Err(InputRejected::NotANumber);
    }
    if value < 0.0 {
        return Err(InputRejected::Negative);
    }
    // "-0" parses as negative zero
    Ok(Some(if value == 0.0 { 0.0 } else { value }))
}

/// Two-decimal rendering used for derived figures.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
