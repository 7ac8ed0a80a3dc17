#![forbid(unsafe_code)]

//! Folio terminal frontend.
//!
//! Renders the portfolio page in a terminal and maps keys and mouse events
//! onto the page controller through the deterministic host.

pub mod app;
pub mod cli;
pub mod layout;
pub mod links;
pub mod logging;
pub mod palette;
pub mod session;
pub mod transport;
pub mod view;
