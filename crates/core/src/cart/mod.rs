pub mod consolidation;
pub mod store;

use tracing::{debug, info, warn};

use crate::domain::cart::{Cart, CartLineId, CartLineItem, CartTotals};
use crate::domain::product::ProductId;
use crate::errors::ApplicationError;

pub use consolidation::AddOutcome;
pub use store::{CartSnapshotStore, InMemoryCartSnapshotStore, DEFAULT_SNAPSHOT_SLOT};

/// Owns the cart and its persisted snapshot. Every mutation is written through as a whole
/// before it becomes visible; a failed write leaves the cart untouched.
pub struct CartConsolidator<S> {
    store: S,
    cart: Cart,
}

impl<S> CartConsolidator<S>
where
    S: CartSnapshotStore,
{
    /// Reads the snapshot once. Absent or undecodable snapshots start an empty cart.
    pub async fn load(store: S) -> Result<Self, ApplicationError> {
        let cart = match store.read_snapshot().await? {
            None => {
                debug!(event_name = "cart.snapshot.absent", "no cart snapshot, starting empty");
                Cart::default()
            }
            Some(payload) => match store::decode_snapshot(&payload) {
                Ok(lines) => consolidation::consolidate(lines),
                Err(error) => {
                    warn!(
                        event_name = "cart.snapshot.corrupt",
                        error = %error,
                        "discarding undecodable cart snapshot"
                    );
                    Cart::default()
                }
            },
        };

        Ok(Self { store, cart })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self, delivery_fee: u64) -> CartTotals {
        self.cart.totals(delivery_fee)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn add_line_item(
        &mut self,
        item: CartLineItem,
    ) -> Result<AddOutcome, ApplicationError> {
        let product_id = item.product_id.clone();
        let (next, outcome) = consolidation::add_line_item(self.cart.clone(), item);
        self.commit(next).await?;

        match &outcome {
            AddOutcome::Appended { line_id } => info!(
                event_name = "cart.line.appended",
                product_id = %product_id.0,
                line_id = %line_id.0,
                "cart line appended"
            ),
            AddOutcome::Merged { line_id, quantity } => info!(
                event_name = "cart.line.merged",
                product_id = %product_id.0,
                line_id = %line_id.0,
                quantity = *quantity,
                "cart line merged into existing configuration"
            ),
        }
        Ok(outcome)
    }

    /// Returns how many lines were removed.
    pub async fn remove_line_item(
        &mut self,
        product_id: &ProductId,
    ) -> Result<usize, ApplicationError> {
        let before = self.cart.len();
        let next = consolidation::remove_line_item(self.cart.clone(), product_id);
        let removed = before - next.len();
        self.commit(next).await?;
        Ok(removed)
    }

    pub async fn remove_line(&mut self, line_id: &CartLineId) -> Result<bool, ApplicationError> {
        let before = self.cart.len();
        let next = consolidation::remove_line(self.cart.clone(), line_id);
        let removed = next.len() < before;
        self.commit(next).await?;
        Ok(removed)
    }

    pub async fn clear(&mut self) -> Result<(), ApplicationError> {
        let next = consolidation::clear(self.cart.clone());
        self.commit(next).await
    }

    async fn commit(&mut self, next: Cart) -> Result<(), ApplicationError> {
        let payload = store::encode_snapshot(&next)?;
        self.store.write_snapshot(payload).await?;
        debug!(event_name = "cart.snapshot.written", lines = next.len(), "cart snapshot written");
        self.cart = next;
        Ok(())
    }
}
