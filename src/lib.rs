//! Trading journal core: economic-calendar news, trades, weekly plans and
//! the views derived from them.

pub mod calendar;
pub mod classify;
pub mod config;
pub mod dates;
pub mod filters;
pub mod import;
pub mod plan;
pub mod state;
pub mod stats;
pub mod store;
pub mod trades;
pub mod types;
pub mod utils;
pub mod weekly;
