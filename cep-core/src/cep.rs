use std::fmt;

use crate::error::PipelineError;

/// Returns true for exactly `NNNNNNNN` or `NNNNN-NNN` (ASCII digits only).
pub fn validate(cep: &str) -> bool {
    let bytes = cep.as_bytes();
    match bytes.len() {
        8 => bytes.iter().all(u8::is_ascii_digit),
        9 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// A syntactically valid CEP, stored as its 8 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

impl Cep {
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        if !validate(raw) {
            return Err(PipelineError::InvalidCep);
        }
        Ok(Self(raw.chars().filter(char::is_ascii_digit).collect()))
    }

    /// Digits-only form, as sent to the postal-code provider.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Cep {
    type Error = PipelineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Cep::parse(value)
    }
}
