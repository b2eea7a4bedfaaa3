pub mod connection;
pub mod messages;
pub mod row;
pub mod table_store;
pub mod tables;
pub mod traits;

pub use connection::{CloseReason, ConnectionState, wait_closed};
pub use messages::{Action, Command, InboundMessage, UnknownAction};
pub use row::Row;
pub use table_store::TableStore;
pub use traits::{CommandError, CommandSink};
