//! `namedraw` assigns every name in a list a unique random number.
//!
//! The library backs the `namedraw` CLI binary:
//! - Parsing free-form name input (comma / semicolon / newline separated)
//! - An unbiased Fisher-Yates shuffle over OS randomness
//! - The `Drawer` state machine that locks the list after a draw
//! - CSV and clipboard text exports
//! - A controller that drives injected renderer / clipboard / exporter ports

/// UI controller owning one draw.
pub mod controller;
/// Name list, draw and lock state.
pub mod draw;
/// CSV and clipboard text formats.
pub mod export;
/// Input parsing helpers.
pub mod names;
/// Renderer, clipboard and exporter traits plus CLI implementations.
pub mod ports;
/// Interactive line-based session.
pub mod session;
/// Cryptographically sourced shuffling.
pub mod shuffle;
