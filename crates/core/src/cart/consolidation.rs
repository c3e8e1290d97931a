use crate::domain::cart::{Cart, CartLineId, CartLineItem};
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Appended { line_id: CartLineId },
    Merged { line_id: CartLineId, quantity: u32 },
}

impl AddOutcome {
    pub fn line_id(&self) -> &CartLineId {
        match self {
            Self::Appended { line_id } | Self::Merged { line_id, .. } => line_id,
        }
    }
}

/// Merge on identical consolidation key, otherwise append. On merge only the quantity moves;
/// the first-added unit price and every other field stay as they were.
pub fn add_line_item(mut cart: Cart, item: CartLineItem) -> (Cart, AddOutcome) {
    let key = item.consolidation_key();
    if let Some(existing) = cart.line_for_key_mut(&key) {
        existing.quantity = existing.quantity.saturating_add(item.quantity);
        let outcome =
            AddOutcome::Merged { line_id: existing.line_id.clone(), quantity: existing.quantity };
        return (cart, outcome);
    }

    let outcome = AddOutcome::Appended { line_id: item.line_id.clone() };
    cart.lines.push(item);
    (cart, outcome)
}

/// Drops every line of the product, whatever its configuration.
pub fn remove_line_item(mut cart: Cart, product_id: &ProductId) -> Cart {
    cart.lines.retain(|line| &line.product_id != product_id);
    cart
}

/// Drops exactly one line.
pub fn remove_line(mut cart: Cart, line_id: &CartLineId) -> Cart {
    cart.lines.retain(|line| &line.line_id != line_id);
    cart
}

pub fn clear(_cart: Cart) -> Cart {
    Cart::default()
}

/// Re-applies the merge rule over an arbitrary line sequence, keeping first occurrence order.
pub fn consolidate(lines: Vec<CartLineItem>) -> Cart {
    lines.into_iter().fold(Cart::default(), |cart, line| add_line_item(cart, line).0)
}
