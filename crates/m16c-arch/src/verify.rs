//! Decode/encode roundtrip checking and its diagnostic side channel.
//!
//! A mismatch never changes what the caller gets back from rendering; it is
//! reported through a [`DiagnosticSink`] and the render result is returned
//! unchanged.

use std::fmt::Write as _;

use thiserror::Error;

use crate::error::EncodeError;
use crate::mc::{encode, Instruction};

/// A decoded instruction that does not re-encode to its source bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundtripError {
    /// Re-encoding produced different bytes.
    #[error("roundtrip mismatch at {address:#07x} for `{text}`: {} != {}", hex(.original), hex(.reencoded))]
    Mismatch {
        /// Address the instruction was decoded at.
        address: u32,
        /// Rendered instruction text.
        text: String,
        /// Source bytes, truncated to the decoded length.
        original: Vec<u8>,
        /// Bytes produced by the encoder.
        reencoded: Vec<u8>,
    },
    /// The encoder rejected the decoded instruction.
    #[error("cannot re-encode `{text}` at {address:#07x}")]
    Encode {
        /// Address the instruction was decoded at.
        address: u32,
        /// Rendered instruction text.
        text: String,
        /// Source bytes, truncated to the decoded length.
        original: Vec<u8>,
        /// Encoder failure.
        #[source]
        source: EncodeError,
    },
}

/// Lower-case hex without separators, e.g. `7cf210`.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Re-encodes `instruction` at `address` and compares against `bytes`.
///
/// `bytes` is the window the instruction was decoded from; only its first
/// `instruction.length()` bytes take part in the comparison.
///
/// # Errors
///
/// Returns [`RoundtripError::Encode`] when the encoder fails and
/// [`RoundtripError::Mismatch`] when it produces different bytes.
pub fn verify_roundtrip(
    instruction: &Instruction,
    bytes: &[u8],
    address: u32,
    text: &str,
) -> Result<(), RoundtripError> {
    let original = &bytes[..instruction.length().min(bytes.len())];
    let reencoded = encode(instruction, address).map_err(|source| RoundtripError::Encode {
        address,
        text: text.to_owned(),
        original: original.to_vec(),
        source,
    })?;
    if reencoded == original {
        return Ok(());
    }
    Err(RoundtripError::Mismatch {
        address,
        text: text.to_owned(),
        original: original.to_vec(),
        reencoded,
    })
}

/// Receiver for roundtrip failures.
///
/// Shared across concurrent render calls, hence `Send + Sync` and `&self`.
pub trait DiagnosticSink: Send + Sync {
    /// Records one failure. Must not panic.
    fn roundtrip_failed(&self, error: &RoundtripError);
}

/// Default sink: one `log::error!` record per line of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn roundtrip_failed(&self, error: &RoundtripError) {
        log::error!("Instruction roundtrip error");
        match error {
            RoundtripError::Mismatch {
                text,
                original,
                reencoded,
                ..
            } => {
                log::error!("{text}");
                log::error!("Orig: {}", hex(original));
                log::error!("New:  {}", hex(reencoded));
            }
            RoundtripError::Encode {
                text,
                original,
                source,
                ..
            } => {
                log::error!("{text}");
                log::error!("Orig: {}", hex(original));
                log::error!("New:  <{source}>");
            }
        }
    }
}
