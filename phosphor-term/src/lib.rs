//! Terminal state and terminal-to-texture synthesis for the phosphor CRT
//! renderer.
//!
//! This crate owns the CPU half of the pipeline: an append-only entry log
//! with a live input line ([`TerminalSession`]), and a fixed-rate
//! [`Synthesizer`] that rasterizes snapshots of it into a single-writer RGBA
//! [`FrameBuffer`]. The GPU side (`phosphor-core`) uploads that buffer as a
//! texture and never touches terminal state directly.

mod entry;
mod error;
mod frame;
mod raster;
mod synth;
mod wrap;

pub use entry::{
    EntryId, EntryKind, TYPING_TIMEOUT_MS, TerminalEntry, TerminalSession, TerminalSnapshot,
};
pub use error::Error;
pub use frame::{FrameBuffer, Rgba};
pub use raster::{BlockRaster, CosmicRaster, TextRaster};
pub use synth::{BLINK_INTERVAL_MS, DEFAULT_TICK_HZ, Synthesizer, TerminalStyle, TickTimer};
pub use wrap::{wrap_line, wrap_text};
