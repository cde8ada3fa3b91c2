// Image module - Program image decoding
//
// Program images travel as standard (padded) base64 text. This module turns
// that text into the raw bytes handed to the VM on load.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Reason a transport-encoded image could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A symbol outside `[A-Za-z0-9+/=]`, misplaced padding, or a final
    /// symbol with non-zero trailing bits
    InvalidCharacter {
        /// Byte offset of the offending symbol (after whitespace removal)
        offset: usize,
    },
    /// Length not consistent with valid padding
    InvalidLength,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InvalidCharacter { offset } => {
                write!(f, "invalid base64 character at offset {}", offset)
            }
            DecodeError::InvalidLength => write!(f, "invalid base64 length or padding"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<base64::DecodeError> for DecodeError {
    fn from(e: base64::DecodeError) -> Self {
        match e {
            base64::DecodeError::InvalidByte(offset, _) => DecodeError::InvalidCharacter { offset },
            base64::DecodeError::InvalidLastSymbol(offset, _) => {
                DecodeError::InvalidCharacter { offset }
            }
            base64::DecodeError::InvalidLength(_) => DecodeError::InvalidLength,
            base64::DecodeError::InvalidPadding => DecodeError::InvalidLength,
        }
    }
}

/// Errors that can occur while reading an image from disk
#[derive(Debug)]
pub enum ImageError {
    /// I/O error
    Io(io::Error),

    /// The file contents are not a valid encoded image
    Decode(DecodeError),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Io(e) => write!(f, "I/O error: {}", e),
            ImageError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<io::Error> for ImageError {
    fn from(e: io::Error) -> Self {
        ImageError::Io(e)
    }
}

impl From<DecodeError> for ImageError {
    fn from(e: DecodeError) -> Self {
        ImageError::Decode(e)
    }
}

/// Decoded program image
///
/// An immutable byte sequence. Ownership moves into the VM on load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramImage {
    bytes: Vec<u8>,
}

impl ProgramImage {
    /// Wrap raw program bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Read a base64 image file and decode it
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust8::image::ProgramImage;
    ///
    /// let image = ProgramImage::from_file("pong.b64").expect("Failed to read image");
    /// println!("{} bytes", image.len());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(decode(&text)?)
    }

    /// Program bytes in load order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of program bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the image and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for ProgramImage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Decode standard padded base64 text into a program image
///
/// ASCII whitespace is ignored so that wrapped image files decode. On
/// failure no bytes are returned.
///
/// # Example
///
/// ```
/// use rust8::image::decode;
///
/// let image = decode("AOA=").unwrap();
/// assert_eq!(image.as_bytes(), &[0x00, 0xE0]);
/// ```
pub fn decode(encoded: &str) -> Result<ProgramImage, DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD.decode(compact.as_bytes())?;
    debug!(bytes = bytes.len(), "decoded program image");

    Ok(ProgramImage::new(bytes))
}

/// Encode raw bytes as standard padded base64 text
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
