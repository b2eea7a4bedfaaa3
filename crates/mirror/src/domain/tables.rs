//! Table and field names used by the venue's realtime feed.

pub const ORDER: &str = "order";
pub const EXECUTION: &str = "execution";
pub const POSITION: &str = "position";
pub const QUOTE: &str = "quote";
pub const TRADE: &str = "trade";
pub const MARGIN: &str = "margin";
pub const INSTRUMENT: &str = "instrument";
pub const ORDER_BOOK: &str = "orderBook25";

/// Remaining unfilled size of an order.
pub const LEAVES_QTY: &str = "leavesQty";
pub const CL_ORD_ID: &str = "clOrdID";
pub const TICK_SIZE: &str = "tickSize";
pub const TICK_LOG: &str = "tickLog";
