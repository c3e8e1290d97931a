use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::cart::{Cart, CartLineItem};
use crate::errors::ApplicationError;

pub const DEFAULT_SNAPSHOT_SLOT: &str = "replique_cart";

/// One well-known storage slot holding the whole serialized cart.
/// Writes replace the slot wholesale.
#[async_trait]
pub trait CartSnapshotStore: Send + Sync {
    async fn read_snapshot(&self) -> Result<Option<String>, ApplicationError>;
    async fn write_snapshot(&self, payload: String) -> Result<(), ApplicationError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CartSnapshot {
    lines: Vec<CartLineItem>,
}

pub fn encode_snapshot(cart: &Cart) -> Result<String, ApplicationError> {
    serde_json::to_string(&CartSnapshot { lines: cart.lines.clone() })
        .map_err(|error| ApplicationError::Persistence(format!("cart snapshot encode: {error}")))
}

/// Lines exactly as stored; callers re-consolidate.
pub fn decode_snapshot(payload: &str) -> Result<Vec<CartLineItem>, serde_json::Error> {
    serde_json::from_str::<CartSnapshot>(payload).map(|snapshot| snapshot.lines)
}

#[derive(Clone, Default)]
pub struct InMemoryCartSnapshotStore {
    payload: Arc<Mutex<Option<String>>>,
    fail_writes: bool,
}

impl InMemoryCartSnapshotStore {
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self { payload: Arc::new(Mutex::new(Some(payload.into()))), fail_writes: false }
    }

    /// Store that rejects every write, for exercising persistence failure paths.
    pub fn failing() -> Self {
        Self { payload: Arc::default(), fail_writes: true }
    }

    pub fn payload(&self) -> Option<String> {
        match self.payload.lock() {
            Ok(payload) => payload.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl CartSnapshotStore for InMemoryCartSnapshotStore {
    async fn read_snapshot(&self) -> Result<Option<String>, ApplicationError> {
        Ok(self.payload())
    }

    async fn write_snapshot(&self, payload: String) -> Result<(), ApplicationError> {
        if self.fail_writes {
            return Err(ApplicationError::Persistence("snapshot slot is read-only".to_string()));
        }
        match self.payload.lock() {
            Ok(mut slot) => *slot = Some(payload),
            Err(poisoned) => *poisoned.into_inner() = Some(payload),
        }
        Ok(())
    }
}
