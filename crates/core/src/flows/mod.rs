pub mod session;
pub mod states;

pub use session::{recompute, CommitReceipt, ConfiguratorSession, PriceQuote, SessionId};
pub use states::{transition, SessionError, SessionEvent, SessionState};
