use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the entire coin-portfolio-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local validation ────────────────────────────────────────────
    #[error("Holding validation failed: {0}")]
    Validation(ValidationErrors),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error (HTTP {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A portfolio operation failed; `message` is what the user is shown.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Not authenticated: log in before calling the portfolio API")]
    NotAuthenticated,

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Holding not found: {0}")]
    NotFound(String),
}

impl CoreError {
    /// Message shown to the user for a failed portfolio operation.
    ///
    /// The backend's own `detail` wins when it sent one; every other failure
    /// collapses into the operation's generic `fallback` text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CoreError::Api {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            CoreError::Transport { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Wrap a backend failure with the message the user should see.
    pub fn transport(source: CoreError, fallback: &str) -> Self {
        CoreError::Transport {
            message: source.user_message(fallback),
            source: Box::new(source),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; strip the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(e: ValidationErrors) -> Self {
        CoreError::Validation(e)
    }
}

// ── Field-scoped validation ─────────────────────────────────────────

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Coin,
    Quantity,
    BuyPrice,
    TotalSpent,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Coin => write!(f, "coin"),
            FormField::Quantity => write!(f, "quantity"),
            FormField::BuyPrice => write!(f, "buy_price"),
            FormField::TotalSpent => write!(f, "total_spent"),
        }
    }
}

/// Per-field validation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.fields.remove(&field)
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// ── Input layer ─────────────────────────────────────────────────────

/// Raw amount input refused before it ever reaches a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputRejected {
    #[error("Amount cannot be negative")]
    Negative,

    #[error("Amount is not a number")]
    NotANumber,

    #[error("Field {0} is derived in the current entry mode")]
    DerivedField(FormField),
}
