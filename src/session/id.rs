use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::{DecodeError, DecodeSliceError, Engine};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::{self, FromStr};

/// A session identifier: 16 random bytes, rendered as 22 characters of
/// URL-safe base64 without padding.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, Eq, Hash, PartialEq)]
pub struct Id([u8; 16]);

impl Id {
    pub fn new() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes);
        Self(bytes)
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut encoded = [0u8; 22];
        let written = URL_SAFE_NO_PAD
            .encode_slice(self.0, &mut encoded)
            .map_err(|_| fmt::Error)?;
        let encoded = str::from_utf8(&encoded[..written]).map_err(|_| fmt::Error)?;

        f.write_str(encoded)
    }
}

impl FromStr for Id {
    type Err = DecodeSliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 22 {
            return Err(DecodeSliceError::DecodeError(DecodeError::InvalidLength(
                s.len(),
            )));
        }

        let mut decoded = [0u8; 16];
        let bytes_decoded = URL_SAFE_NO_PAD.decode_slice(s.as_bytes(), &mut decoded)?;
        if bytes_decoded != 16 {
            let err = DecodeError::InvalidLength(bytes_decoded);
            return Err(DecodeSliceError::DecodeError(err));
        }

        Ok(Self(decoded))
    }
}
