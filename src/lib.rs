//! E-paper dashboard library.
//!
//! Everything except process setup lives here so it can be unit tested and
//! shared with the desktop simulator (`simulator/`).
//!
//! # Pipeline
//!
//! ```text
//! Scheduler ── render ──> Dashboard ── update + draw ──> Widgets ──> Canvas
//!     │                                                                │
//!     └──────────── init / display / sleep ──> Panel <─── frame ───────┘
//! ```
//!
//! # Testing
//!
//! ```bash
//! cargo test                     # host, PNG panel
//! cargo test --features hardware # also type-checks the spidev wiring
//! ```

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Configuration and drawing basics
pub mod canvas;
pub mod colors;
pub mod config;
pub mod styles;

// Content
pub mod fetch;
pub mod widgets;

// Output and refresh loop
pub mod dashboard;
pub mod display;
pub mod logging;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use canvas::Canvas;
pub use dashboard::Dashboard;
pub use display::{DisplayError, Panel};
pub use scheduler::{Scheduler, Shutdown};
