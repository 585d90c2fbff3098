use std::borrow::Cow;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::hash::hash_password;

/// A credential and its breach prevalence, keyed by full hash
///
/// The plaintext is kept as the exact bytes read from the input; lists
/// often carry Latin-1 or otherwise non-UTF-8 lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub full_hash: String,
    pub plaintext: Vec<u8>,
    pub prevalence: u64,
}

impl CredentialRecord {
    /// Hash a plaintext credential; prevalence starts at zero
    pub fn from_plaintext(plaintext: impl Into<Vec<u8>>) -> Self {
        let plaintext = plaintext.into();
        Self {
            full_hash: hash_password(&plaintext),
            plaintext,
            prevalence: 0,
        }
    }

    pub fn with_prevalence(mut self, prevalence: u64) -> Self {
        self.prevalence = prevalence;
        self
    }

    /// First five hex characters of the hash
    pub fn prefix(&self) -> &str {
        &self.full_hash[..crate::constants::PREFIX_LEN]
    }

    /// Remaining 35 hex characters of the hash
    pub fn suffix(&self) -> &str {
        &self.full_hash[crate::constants::PREFIX_LEN..]
    }

    /// Plaintext for display; invalid UTF-8 is replaced
    pub fn plaintext_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.plaintext)
    }

    /// Write `plaintext,prevalence\n` with the plaintext bytes untouched
    pub fn write_output_line<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.plaintext)?;
        writeln!(writer, ",{}", self.prevalence)
    }
}
