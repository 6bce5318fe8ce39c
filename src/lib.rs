#![forbid(unsafe_code)]

//! # corsikaio
//!
//! A Rust library for reading the binary output of the CORSIKA air shower
//! simulation program.
//!
//! CORSIKA writes its particle and Cherenkov-photon output as a stream of
//! fixed-size sub-blocks of 4-byte little-endian words, either raw or
//! wrapped in FORTRAN sequential records. Each run starts with a `RUNH`
//! block and ends with `RUNE`; in between, every shower is an `EVTH`
//! block, any number of data and `LONG` blocks, and an `EVTE` block.
//!
//! ## Features
//!
//! - **Framing detection**: raw streams and FORTRAN record wrapping are
//!   told apart automatically, including standard (273-word) and thinned
//!   (312-word) block sizes
//! - **Versioned layouts**: `RUNH`/`EVTH`/`EVTE` field layouts for
//!   CORSIKA 6.5 through 7.7, with a deterministic fallback for unknown
//!   versions
//! - **Typed data rows**: particle and Cherenkov-photon rows, including
//!   the MMCS wavelength/mother-particle encoding
//! - **Compression**: gzip and zstd compressed files are decompressed
//!   transparently
//! - **Longitudinal output**: both the binary `LONG` sub-blocks and the
//!   textual `.long` file
//!
//! ## Quick Start
//!
//! ```no_run
//! use corsikaio::{CorsikaFile, Result};
//!
//! fn main() -> Result<()> {
//!     let mut f = CorsikaFile::open("DAT000001")?;
//!     println!("CORSIKA {}", f.version());
//!
//!     for event in &mut f {
//!         let event = event?;
//!         println!(
//!             "event {:?}: energy {:?} GeV, {} data rows",
//!             event.header.float("event_number"),
//!             event.header.float("total_energy"),
//!             event.data.len(),
//!         );
//!     }
//!
//!     println!("showers in run: {:?}", f.run_end()?.float("n_events"));
//!     Ok(())
//! }
//! ```
//!
//! ### Typed particle rows
//!
//! ```no_run
//! use corsikaio::{CorsikaFile, EventData, Result};
//!
//! fn main() -> Result<()> {
//!     let mut f = CorsikaFile::open_particle("DAT000001")?;
//!     while let Some(event) = f.next_event()? {
//!         if let EventData::Particles(particles) = &event.data {
//!             for p in particles {
//!                 println!("id {} at ({}, {})", p.particle_description, p.x, p.y);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`subblocks`] | Per-kind, per-version sub-block layouts and decoders |
//! | [`parsing`] | Block framing and compression handling |
//! | [`longitudinal`] | Textual `.long` file reader |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `core::result::Result<T, Error>`. The [`Error`] enum covers I/O and
//! decompression failures, framing violations, and malformed blocks;
//! truncated input is always reported as [`Error::Truncated`], never as a
//! silent end of iteration.

pub mod error;
pub mod longitudinal;
pub mod parsing;
pub mod subblocks;

mod event;
mod file;
mod types;

pub use error::{Error, Result};
pub use event::{DataKind, Event, EventData, RawRows};
pub use file::{CorsikaFile, CorsikaOptions};
pub use longitudinal::{
    LongitudinalFit, LongitudinalProfile, LongitudinalReader, read_longitudinal_distributions,
    longitudinal_fit_function,
};
pub use subblocks::longitudinal::LongitudinalRow;
pub use subblocks::{MmcsPhotonRow, ParticleRow, PhotonRow};
pub use types::{Record, Value};
