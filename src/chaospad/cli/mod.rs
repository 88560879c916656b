//! Terminal host for the pads panel. See [`commands`] for the dispatch loop.

pub mod commands;
mod console;
mod render;
mod setup;
