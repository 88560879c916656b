//! # Chaospad Architecture
//!
//! Chaospad is the controller behind a pads admin screen: a table of named text
//! records backed by a REST API, with a create/edit dialog, delete confirmation,
//! search, paging and CSV export. It is a library first. The terminal client in
//! `cli/` is one host for it; a web or desktop shell could drive the same panel.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders tables, prompts on the console │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Panel (panel.rs)                                           │
//! │  - Owns list state, pagination, search and the dialog draft │
//! │  - Routes every failure to the NotificationSink             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Endpoints (endpoints.rs)                                   │
//! │  - Typed calls for the pads routes                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Transport (client/)                                        │
//! │  - ApiClient trait                                          │
//! │  - HttpApiClient (production), InMemoryBackend (testing)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `panel.rs` inward, code never writes to stdout/stderr and never exits
//! the process. User-facing messages go through [`notify::NotificationSink`],
//! diagnostics through `tracing`.
//!
//! ## Testing Strategy
//!
//! The panel is tested against [`client::memory::InMemoryBackend`], which
//! emulates the backend routes and records every request, and
//! [`notify::RecordingNotifier`]. That is where most of the tests live. The
//! CLI has a few end-to-end tests in `tests/`.
//!
//! ## Module Overview
//!
//! - [`panel`]: `PadsAdminPanel`, the entry point for all operations
//! - [`state`]: list, pagination, dialog and loading-flag state
//! - [`endpoints`]: REST routes
//! - [`client`]: transport trait and implementations
//! - [`query`]: list query parameters
//! - [`model`]: `Pad`, `PadDraft`, `Page`, column definitions
//! - [`export`]: CSV export of the loaded page
//! - [`notify`]: error and confirmation sink
//! - [`watch`]: observable values (the search field)
//! - [`timefmt`]: relative time strings
//! - [`config`]: configuration file and environment overrides
//! - [`error`]: error types

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod export;
pub mod model;
pub mod notify;
pub mod panel;
pub mod query;
pub mod state;
pub mod timefmt;
pub mod watch;

pub use error::{ChaospadError, Result};
pub use panel::{Outcome, PadsAdminPanel, PanelSettings};
