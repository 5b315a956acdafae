//! Client for the MacroMeter calorie-tracking backend.
//!
//! [`api`] talks to the REST backend, [`views`] holds the per-screen state
//! machines, and [`shell`] drives them from a terminal.

pub mod api;
pub mod config;
pub mod error;
pub mod images;
pub mod meals;
pub mod session;
pub mod shell;
pub mod state;
pub mod views;
