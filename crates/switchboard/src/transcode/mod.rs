//! Text-safe payload transcoding.
//!
//! Payloads travel as base64 text inside JSON messages and replies. The
//! [`Transcoder`] converts between that text and the binary form handlers
//! work with. Decoding is strict: characters outside the configured alphabet,
//! misplaced padding, or trailing bits all fail rather than being skipped.

use base64::Engine as _;
use base64::engine::GeneralPurpose;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use switchboard_config::PayloadAlphabet;
use thiserror::Error;

/// Errors raised while transcoding a payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranscodeError {
    /// The text is not valid base64 for the configured alphabet.
    #[error("payload is not valid base64: {source}")]
    Decode {
        /// Decoder diagnostic.
        #[source]
        source: base64::DecodeError,
    },
    /// The encoded form of the payload would not fit in memory.
    #[error("payload of {len} bytes cannot be represented as base64")]
    Encode {
        /// Length of the binary payload.
        len: usize,
    },
}

/// Converts payloads between binary and base64 text.
///
/// # Example
///
/// ```
/// use switchboard::transcode::Transcoder;
///
/// let transcoder = Transcoder::default();
/// let text = transcoder.encode(b"hi").expect("encode");
/// assert_eq!(text, "aGk=");
/// assert_eq!(transcoder.decode(&text).expect("decode"), b"hi");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transcoder {
    alphabet: PayloadAlphabet,
}

impl Transcoder {
    /// Creates a transcoder for the given alphabet.
    #[must_use]
    pub const fn new(alphabet: PayloadAlphabet) -> Self {
        Self { alphabet }
    }

    /// Returns the alphabet in use.
    #[must_use]
    pub const fn alphabet(&self) -> PayloadAlphabet {
        self.alphabet
    }

    /// Decodes base64 text into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TranscodeError::Decode`] when `text` contains characters
    /// outside the alphabet or is not correctly padded.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>, TranscodeError> {
        self.engine()
            .decode(text)
            .map_err(|source| TranscodeError::Decode { source })
    }

    /// Encodes bytes as padded base64 text.
    ///
    /// # Errors
    ///
    /// Returns [`TranscodeError::Encode`] when the encoded length overflows
    /// `usize`.
    pub fn encode(&self, bytes: &[u8]) -> Result<String, TranscodeError> {
        let Some(capacity) = base64::encoded_len(bytes.len(), true) else {
            return Err(TranscodeError::Encode { len: bytes.len() });
        };
        let mut text = String::with_capacity(capacity);
        self.engine().encode_string(bytes, &mut text);
        Ok(text)
    }

    fn engine(&self) -> &'static GeneralPurpose {
        match self.alphabet {
            PayloadAlphabet::Standard => &STANDARD,
            PayloadAlphabet::UrlSafe => &URL_SAFE,
        }
    }
}

/// Decodes standard-alphabet base64 text.
///
/// # Errors
///
/// See [`Transcoder::decode`].
pub fn decode(text: &str) -> Result<Vec<u8>, TranscodeError> {
    Transcoder::default().decode(text)
}

/// Encodes bytes as standard-alphabet base64 text.
///
/// # Errors
///
/// See [`Transcoder::encode`].
pub fn encode(bytes: &[u8]) -> Result<String, TranscodeError> {
    Transcoder::default().encode(bytes)
}
