//! Error types for CORSIKA file operations.
//!
//! This module defines the [`Error`] enum which represents all possible
//! failures that can occur when opening, framing, or decoding CORSIKA
//! binary output files.
//!
//! # Example
//!
//! ```no_run
//! use corsikaio::{CorsikaFile, Error, Result};
//!
//! fn process_file(path: &str) -> Result<()> {
//!     match CorsikaFile::open(path) {
//!         Ok(f) => {
//!             println!("CORSIKA version {}", f.version());
//!             Ok(())
//!         }
//!         Err(Error::MissingRunHeader { found }) => {
//!             eprintln!("Not a CORSIKA file, first block tagged {:?}", found);
//!             Err(Error::MissingRunHeader { found })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use core::fmt;

/// Errors that can occur while reading CORSIKA output.
///
/// This enum covers all failure modes: I/O errors, truncated files,
/// framing/protocol violations, and decode-time invariant violations.
#[derive(Debug)]
pub enum Error {
    /// The stream ended before a complete record or block could be read.
    ///
    /// CORSIKA can crash mid-write, so a short read is always surfaced
    /// as an error and never treated as a clean end of stream.
    Truncated {
        /// Number of bytes that were required
        expected: usize,
        /// Number of bytes actually available
        actual: usize,
    },

    /// A FORTRAN record payload length is not a whole multiple of the
    /// block size. This indicates corruption or a wrong thinning flag.
    RecordSizeMismatch {
        /// Payload length declared by the record marker
        record_len: usize,
        /// Block size expected for the current thinning mode
        block_size: usize,
    },

    /// The first block of the file is not tagged `RUNH`.
    MissingRunHeader {
        /// The first 4 bytes that were found instead
        found: [u8; 4],
    },

    /// A block tag appeared where the event state machine does not allow it,
    /// e.g. a data block where `EVTH` or `RUNE` was required, or two `EVTH`
    /// blocks without an intervening `EVTE`.
    UnexpectedBlock {
        /// What the state machine was waiting for
        expected: &'static str,
        /// The tag bytes that were found
        found: [u8; 4],
    },

    /// `decode` was called with a buffer whose length differs from the
    /// compiled layout's item size.
    ///
    /// This is an invariant violation in the framing layer rather than
    /// malformed input.
    LayoutMismatch {
        /// Item size declared by the compiled layout
        expected: usize,
        /// Length of the buffer that was passed in
        actual: usize,
    },

    /// No `RUNE` block could be located when searching backward from the
    /// end of the file.
    RunEndNotFound,

    /// A compressed input stream could not be decompressed.
    Decompression(String),

    /// A longitudinal text file did not match the fixed CORSIKA format.
    LongitudinalFormat(String),

    /// An I/O error occurred while reading the file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Truncated { expected, actual } => write!(
                f,
                "file seems to be truncated: needed {expected} bytes, got {actual}"
            ),
            Error::RecordSizeMismatch {
                record_len,
                block_size,
            } => write!(
                f,
                "record length {record_len} is not a multiple of the block size {block_size}, \
                 file seems to be truncated or corrupted"
            ),
            Error::MissingRunHeader { found } => {
                write!(
                    f,
                    r#"file does not start with b"RUNH", found {:?}"#,
                    TagBytes(found)
                )
            }
            Error::UnexpectedBlock { expected, found } => {
                write!(
                    f,
                    "expected {expected} block but found {:?}",
                    TagBytes(found)
                )
            }
            Error::LayoutMismatch { expected, actual } => write!(
                f,
                "buffer length {actual} does not match layout item size {expected}"
            ),
            Error::RunEndNotFound => write!(f, "no RUNE block found searching from end of file"),
            Error::Decompression(msg) => write!(f, "decompression failed: {msg}"),
            Error::LongitudinalFormat(msg) => write!(f, "invalid longitudinal file: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

/// Renders tag bytes as ASCII where possible, hex otherwise.
struct TagBytes<'a>(&'a [u8; 4]);

impl fmt::Debug for TagBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.0) {
            Ok(s) if s.chars().all(|c| c.is_ascii_graphic()) => write!(f, "{s:?}"),
            _ => write!(f, "{:02x?}", self.0),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized Result type for CORSIKA file operations.
pub type Result<T> = core::result::Result<T, Error>;
