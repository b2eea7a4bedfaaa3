pub mod event_applier;
pub mod query;
pub mod readiness;
pub mod shared_store;

pub use event_applier::{ApplyError, ApplyOutcome};
pub use query::{QueryError, Ticker};
pub use readiness::{ACCOUNT_TABLES, ReadinessGate, SYMBOL_TABLES};
pub use shared_store::SharedTableStore;
