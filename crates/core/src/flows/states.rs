use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::options::{FinishColor, Material};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Seeding,
    Editing,
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Seeded,
    MaterialSelected,
    ColorSelected,
    DimensionChanged,
    DimensionsReset,
    AssemblyChanged,
    QuantityChanged,
    AddToCartRequested,
}

impl SessionEvent {
    pub fn is_edit(self) -> bool {
        !matches!(self, Self::Seeded | Self::AddToCartRequested)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("configurator is not ready: selection has not been seeded")]
    NotReady,
    #[error("configurator session already committed to the cart")]
    AlreadyCommitted,
    #[error("invalid session transition from {state:?} using event {event:?}")]
    InvalidTransition { state: SessionState, event: SessionEvent },
    #[error("quantity must be at least 1, got {quantity}")]
    InvalidQuantity { quantity: u32 },
    #[error("material `{material}` is not offered for this product")]
    UnavailableMaterial { material: Material },
    #[error("finish color `{color}` is not offered for this product")]
    UnavailableColor { color: FinishColor },
    #[error("product `{product_id}` was not found in the catalog")]
    ProductNotFound { product_id: String },
}

/// `Seeding -> Editing -> Committed`. Edits keep the session in `Editing`; `Committed` is
/// terminal.
pub fn transition(
    current: SessionState,
    event: SessionEvent,
) -> Result<SessionState, SessionError> {
    use SessionState::{Committed, Editing, Seeding};

    match (current, event) {
        (Seeding, SessionEvent::Seeded) => Ok(Editing),
        (Seeding, _) => Err(SessionError::NotReady),
        (Editing, SessionEvent::AddToCartRequested) => Ok(Committed),
        (Editing, event) if event.is_edit() => Ok(Editing),
        (Committed, _) => Err(SessionError::AlreadyCommitted),
        (state, event) => Err(SessionError::InvalidTransition { state, event }),
    }
}
