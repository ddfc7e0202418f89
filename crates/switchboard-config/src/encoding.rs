//! Payload alphabet selection for the transcoder.
//!
//! Both alphabets are padded base64; they differ only in the two characters
//! used for values 62 and 63. The URL-safe alphabet suits transports that
//! embed payloads in URLs or file names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Base64 alphabet used for message and reply payloads.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PayloadAlphabet {
    /// RFC 4648 standard alphabet (`+` and `/`).
    #[default]
    Standard,
    /// RFC 4648 URL and filename safe alphabet (`-` and `_`).
    UrlSafe,
}

/// Errors encountered while parsing a [`PayloadAlphabet`] from text.
pub type PayloadAlphabetParseError = strum::ParseError;
