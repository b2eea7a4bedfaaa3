//! Read-only views derived from the mirror on demand.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::row::{self, Row};
use crate::domain::tables::{
    CL_ORD_ID, INSTRUMENT, LEAVES_QTY, MARGIN, ORDER, ORDER_BOOK, QUOTE, TICK_LOG, TICK_SIZE,
    TRADE,
};
use crate::domain::TableStore;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Table '{0}' has not been received")]
    MissingTable(String),
    #[error("Table '{0}' is empty")]
    EmptyTable(String),
    #[error("{table}: field '{field}' is missing or not numeric")]
    InvalidField { table: String, field: String },
}

/// Best prices and last trade, rounded to the instrument's tick precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ticker {
    pub last: Decimal,
    pub buy: Decimal,
    pub sell: Decimal,
    pub mid: Decimal,
}

/// The instrument row with a derived `tickLog` (decimal places of `tickSize`).
pub fn instrument(store: &TableStore) -> Result<Row, QueryError> {
    let mut instrument = first_row(store, INSTRUMENT)?.clone();
    let tick_log = tick_log(&instrument)?;
    instrument.insert(TICK_LOG.to_string(), Value::from(tick_log));
    Ok(instrument)
}

/// Ticker built from the latest quote and the latest trade.
pub fn ticker(store: &TableStore) -> Result<Ticker, QueryError> {
    let quote = last_row(store, QUOTE)?;
    let trade = last_row(store, TRADE)?;
    let places = tick_log(first_row(store, INSTRUMENT)?)?;

    let bid = row::number(quote, "bidPrice").unwrap_or(0.0);
    let ask = row::number(quote, "askPrice").unwrap_or(0.0);
    let last = row::number(trade, "price").unwrap_or(0.0);

    Ok(Ticker {
        last: round_to(last, places),
        buy: round_to(bid, places),
        sell: round_to(ask, places),
        mid: round_to((bid + ask) / 2.0, places),
    })
}

/// Account margin
pub fn funds(store: &TableStore) -> Result<Row, QueryError> {
    first_row(store, MARGIN).cloned()
}

pub fn market_depth(store: &TableStore) -> Result<Vec<Row>, QueryError> {
    table(store, ORDER_BOOK).map(<[Row]>::to_vec)
}

/// Our open orders: client order id starts with `prefix` and quantity remains.
///
/// A non-string `clOrdID` is matched on its JSON text (`null`, `42`); rows
/// without one never match.
pub fn open_orders(store: &TableStore, prefix: &str) -> Result<Vec<Row>, QueryError> {
    let orders = table(store, ORDER)?;
    Ok(orders
        .iter()
        .filter(|order| {
            let ours = order.get(CL_ORD_ID).is_some_and(|id| match id {
                Value::String(s) => s.starts_with(prefix),
                other => other.to_string().starts_with(prefix),
            });
            ours && row::number(order, LEAVES_QTY).is_some_and(|qty| qty > 0.0)
        })
        .cloned()
        .collect())
}

/// All trades in arrival order
pub fn recent_trades(store: &TableStore) -> Result<Vec<Row>, QueryError> {
    table(store, TRADE).map(<[Row]>::to_vec)
}

fn table<'a>(store: &'a TableStore, name: &str) -> Result<&'a [Row], QueryError> {
    store
        .table(name)
        .ok_or_else(|| QueryError::MissingTable(name.to_string()))
}

fn first_row<'a>(store: &'a TableStore, name: &str) -> Result<&'a Row, QueryError> {
    table(store, name)?
        .first()
        .ok_or_else(|| QueryError::EmptyTable(name.to_string()))
}

fn last_row<'a>(store: &'a TableStore, name: &str) -> Result<&'a Row, QueryError> {
    table(store, name)?
        .last()
        .ok_or_else(|| QueryError::EmptyTable(name.to_string()))
}

/// round(|log10(tickSize)|): 0.5 -> 0, 0.01 -> 2
fn tick_log(instrument: &Row) -> Result<u32, QueryError> {
    match row::number(instrument, TICK_SIZE) {
        Some(tick) if tick > 0.0 => Ok(tick.log10().abs().round() as u32),
        _ => Err(QueryError::InvalidField {
            table: INSTRUMENT.to_string(),
            field: TICK_SIZE.to_string(),
        }),
    }
}

fn round_to(value: f64, places: u32) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}
