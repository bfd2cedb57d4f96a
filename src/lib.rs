//! logrows
//!
//! A virtualized log-row engine plus a terminal viewer that drives it.
//!
//! The pure core lives in [`engine`] (keys, height estimation, dedup/sort,
//! windowing) and [`state`] (selection popover, listener registry, the
//! composed rows component). [`source`], [`config`], [`logging`] and
//! [`view`] form the impure shell around it.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod view;
