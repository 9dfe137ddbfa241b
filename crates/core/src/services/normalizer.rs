use crate::errors::{FormField, ValidationErrors};
use crate::models::coin::CoinCatalog;
use crate::models::draft::{EntryDraft, EntryMode};
use crate::models::holding::HoldingPayload;
use crate::services::reconciler::{positive, EntryReconciler};

/// Turns a submitted draft into the canonical creation payload.
///
/// Validation is field-scoped: every failing field gets its own message
/// and nothing is sent to the backend unless all of them pass. The payload
/// always carries a per-unit `buy_price`.
pub struct HoldingNormalizer;

impl HoldingNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Validate `draft` against `catalog` and build the payload.
    ///
    /// The derived figure is recomputed here rather than trusted, and every
    /// amount must be finite and strictly positive.
    pub fn normalize(
        &self,
        draft: &EntryDraft,
        catalog: &CoinCatalog,
    ) -> Result<HoldingPayload, ValidationErrors> {
        let draft = &EntryReconciler::new().reconcile(draft.clone());
        let mut errors = ValidationErrors::new();

        let coin = draft
            .coin
            .as_ref()
            .filter(|c| !c.id.trim().is_empty() && catalog.contains(c));
        if coin.is_none() {
            errors.insert(FormField::Coin, "Please select a coin from the list");
        }

        let quantity = positive(draft.quantity);
        if quantity.is_none() {
            errors.insert(FormField::Quantity, "Valid quantity is required");
        }

        let buy_price = positive(draft.buy_price());
        match draft.mode() {
            EntryMode::PerUnit => {
                if buy_price.is_none() {
                    errors.insert(FormField::BuyPrice, "Valid buy price is required");
                }
            }
            EntryMode::TotalSpent => {
                if positive(draft.total_spent()).is_none() {
                    errors.insert(FormField::TotalSpent, "Valid total spent is required");
                }
                if buy_price.is_none() {
                    errors.insert(
                        FormField::BuyPrice,
                        "Cannot calculate price per coin - check your inputs",
                    );
                }
            }
        }

        match (coin, quantity, buy_price) {
            (Some(coin), Some(quantity), Some(buy_price)) if errors.is_empty() => {
                Ok(HoldingPayload {
                    coin: coin.id.clone(),
                    coin_symbol: coin.symbol.clone(),
                    quantity,
                    buy_price,
                    currency: draft.currency.clone(),
                    notes: draft.notes.clone(),
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate a draft and record the outcome on it: errors are stored on
    /// the draft (replacing previous ones) so the form can highlight them.
    pub fn submit(
        &self,
        draft: &mut EntryDraft,
        catalog: &CoinCatalog,
    ) -> Result<HoldingPayload, ValidationErrors> {
        let result = self.normalize(draft, catalog);
        draft.errors = match &result {
            Ok(_) => ValidationErrors::new(),
            Err(errors) => errors.clone(),
        };
        result
    }

    /// Re-run normalization over a payload that was already built.
    /// A valid payload comes back unchanged.
    pub fn renormalize(
        &self,
        payload: &HoldingPayload,
        catalog: &CoinCatalog,
    ) -> Result<HoldingPayload, ValidationErrors> {
        self.normalize(&EntryDraft::from_payload(payload), catalog)
    }
}

impl Default for HoldingNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
