//! SHA-1 fingerprint of a candidate password, split for k-anonymity lookups.

use sha1::{Digest, Sha1};

/// Hex characters sent to the range service.
pub const PREFIX_LEN: usize = 5;

/// Upper-case SHA-1 hex digest of a password, split into the part that may
/// leave the machine (`prefix`) and the part that never does (`suffix`).
///
/// `Debug` shows the prefix only.
#[derive(Clone, PartialEq, Eq)]
pub struct Fingerprint {
    full: String,
}

impl Fingerprint {
    /// Hash the UTF-8 bytes of `password`.
    pub fn of(password: &str) -> Self {
        let digest = Sha1::digest(password.as_bytes());
        Self {
            full: hex::encode_upper(digest),
        }
    }

    /// All 40 hex characters.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// First 5 hex characters.
    pub fn prefix(&self) -> &str {
        &self.full[..PREFIX_LEN]
    }

    /// Remaining 35 hex characters.
    pub fn suffix(&self) -> &str {
        &self.full[PREFIX_LEN..]
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fingerprint")
            .field("prefix", &self.prefix())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let fp = Fingerprint::of("password");
        assert_eq!(fp.full(), "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8");
        assert_eq!(fp.prefix(), "5BAA6");
        assert_eq!(fp.suffix(), "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
    }

    #[test]
    fn test_split_is_lossless_and_deterministic() {
        for password in ["a", "correct horse battery staple", "pässwörd", "🔑🔑", " "] {
            let first = Fingerprint::of(password);
            let second = Fingerprint::of(password);
            assert_eq!(first, second);
            assert_eq!(first.full().len(), 40);
            assert_eq!(first.prefix().len(), 5);
            assert_eq!(first.suffix().len(), 35);
            assert_eq!(format!("{}{}", first.prefix(), first.suffix()), first.full());
            assert!(first.full().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_debug_hides_suffix() {
        let fp = Fingerprint::of("password");
        let shown = format!("{:?}", fp);
        assert!(shown.contains("5BAA6"));
        assert!(!shown.contains(fp.suffix()));
    }
}
