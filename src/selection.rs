use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantInputKind {
    Choice,
    ColorSwatch,
}

#[derive(Debug, Clone)]
pub struct VariantGroup {
    pub id: Uuid,
    pub name: String,
    pub kind: VariantInputKind,
}

#[derive(Debug, Clone)]
pub struct VariantValue {
    pub id: Uuid,
    pub group_id: Uuid,
    pub label: String,
    pub price_delta: Decimal,
    pub is_default: bool,
}

/// One product's configurable state on a product page: at most one selected
/// value per variant group, a quantity, and the derived prices. Consumed
/// read-only by the cart at add-to-cart time.
#[derive(Debug, Clone)]
pub struct VariantSelectionModel {
    product_id: Uuid,
    base_price: Decimal,
    quantity: i32,
    group_ids: Vec<Uuid>,
    selected: HashMap<Uuid, VariantValue>,
}

impl VariantSelectionModel {
    pub fn new(product_id: Uuid, base_price: Decimal, groups: &[VariantGroup]) -> Self {
        Self {
            product_id,
            base_price,
            quantity: 1,
            group_ids: groups.iter().map(|g| g.id).collect(),
            selected: HashMap::new(),
        }
    }

    /// Build a model with each group's default value pre-selected, as a
    /// product page does on load.
    pub fn with_defaults(
        product_id: Uuid,
        base_price: Decimal,
        groups: &[VariantGroup],
        values: &[VariantValue],
    ) -> Self {
        let mut model = Self::new(product_id, base_price, groups);
        for group in groups {
            if let Some(value) = values.iter().find(|v| v.group_id == group.id && v.is_default) {
                model.select_value(group.id, value.clone());
            }
        }
        model
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Single-select replace. A group id the model was not constructed with
    /// is ignored; values are only ever sourced from the product's own groups.
    pub fn select_value(&mut self, group_id: Uuid, value: VariantValue) {
        if !self.group_ids.contains(&group_id) {
            return;
        }
        self.selected.insert(group_id, value);
    }

    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity.max(1);
    }

    pub fn increment(&mut self) {
        self.quantity += 1;
    }

    pub fn decrement(&mut self) {
        self.quantity = (self.quantity - 1).max(1);
    }

    pub fn unit_price(&self) -> Decimal {
        let delta: Decimal = self.selected.values().map(|v| v.price_delta).sum();
        (self.base_price + delta).round_dp(2)
    }

    pub fn total(&self) -> Decimal {
        (self.unit_price() * Decimal::from(self.quantity)).round_dp(2)
    }

    /// The unordered set of selected variant-value identities. Two
    /// selections with the same membership have the same signature no matter
    /// the insertion order.
    pub fn signature(&self) -> BTreeSet<Uuid> {
        self.selected.values().map(|v| v.id).collect()
    }

    /// Signature as the sorted ids joined with `:`, the form stored on the
    /// cart line for the backend uniqueness constraint.
    pub fn signature_key(&self) -> String {
        self.signature()
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }

    pub fn selected_values(&self) -> Vec<&VariantValue> {
        let mut values: Vec<&VariantValue> = self.selected.values().collect();
        values.sort_by_key(|v| v.id);
        values
    }
}
