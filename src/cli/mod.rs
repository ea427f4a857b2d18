//! Terminal presentation for the engine

pub mod convert;
pub mod market;
pub mod rates;
pub mod setup;
pub mod simulate;
pub mod ui;
