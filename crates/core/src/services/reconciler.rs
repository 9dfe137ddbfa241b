use crate::errors::{FormField, InputRejected};
use crate::models::draft::{parse_amount, AmountField, EntryDraft, EntryMode, PriceEntry};

/// Keeps the add-holding draft consistent: derives whichever of
/// price-per-unit / total-spent the current mode does not let the user type.
///
/// Pure business logic, no I/O. Arithmetic edge cases (zero or empty
/// quantity) resolve to an empty derived value, never NaN or infinity.
pub struct EntryReconciler;

impl EntryReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Recompute the derived field of `draft` from its user-owned fields.
    pub fn reconcile(&self, mut draft: EntryDraft) -> EntryDraft {
        self.reconcile_in_place(&mut draft);
        draft
    }

    fn reconcile_in_place(&self, draft: &mut EntryDraft) {
        let quantity = positive(draft.quantity);
        draft.entry = match draft.entry {
            PriceEntry::PerUnit { buy_price, .. } => PriceEntry::PerUnit {
                buy_price,
                total_spent: derive(quantity, positive(buy_price), |q, p| q * p),
            },
            PriceEntry::TotalSpent { total_spent, .. } => PriceEntry::TotalSpent {
                total_spent,
                buy_price: derive(quantity, positive(total_spent), |q, t| t / q),
            },
        };
    }

    /// Apply raw text typed into an amount field, then reconcile.
    ///
    /// Rejected input (negative, non-numeric, or aimed at the derived field)
    /// leaves the draft untouched.
    pub fn set_amount(
        &self,
        draft: &mut EntryDraft,
        field: AmountField,
        raw: &str,
    ) -> Result<(), InputRejected> {
        if field == draft.entry.derived_field() {
            return Err(InputRejected::DerivedField(field.form_field()));
        }
        let value = parse_amount(raw)?;
        match (field, &mut draft.entry) {
            (AmountField::Quantity, _) => draft.quantity = value,
            (AmountField::BuyPrice, PriceEntry::PerUnit { buy_price, .. }) => *buy_price = value,
            (AmountField::TotalSpent, PriceEntry::TotalSpent { total_spent, .. }) => {
                *total_spent = value
            }
            // derived fields were refused above
            _ => {}
        }
        draft.errors.remove(field.form_field());
        self.reconcile_in_place(draft);
        Ok(())
    }

    /// Switch the entry mode.
    ///
    /// The field that becomes user-owned keeps whatever value it showed, the
    /// field that becomes derived is cleared and recomputed, and errors on
    /// both price fields are dropped.
    pub fn switch_mode(&self, mut draft: EntryDraft, mode: EntryMode) -> EntryDraft {
        draft.entry = match mode {
            EntryMode::PerUnit => PriceEntry::PerUnit {
                buy_price: draft.entry.buy_price(),
                total_spent: None,
            },
            EntryMode::TotalSpent => PriceEntry::TotalSpent {
                total_spent: draft.entry.total_spent(),
                buy_price: None,
            },
        };
        draft.errors.remove(FormField::BuyPrice);
        draft.errors.remove(FormField::TotalSpent);
        self.reconcile(draft)
    }
}

impl Default for EntryReconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// `value` if it is a finite amount above zero.
pub(crate) fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn derive(a: Option<f64>, b: Option<f64>, op: impl Fn(f64, f64) -> f64) -> Option<f64> {
    let result = op(a?, b?);
    (result.is_finite() && result > 0.0).then_some(result)
}
