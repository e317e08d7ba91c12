//! Property fingerprint check: does the PDF carry the Info-dictionary values
//! of a known statement producer?

use pesa_core::{DocumentProperties, KnownFingerprint};

/// A pinned property whose value differs from the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone)]
pub struct PropertyFingerprintValidator {
    fingerprints: Vec<KnownFingerprint>,
}

impl PropertyFingerprintValidator {
    pub fn new(fingerprints: Vec<KnownFingerprint>) -> Self {
        Self { fingerprints }
    }

    /// True when some fingerprint's pinned fields all equal the document's
    /// (exact, case-sensitive).
    pub fn is_valid(&self, props: &DocumentProperties) -> bool {
        self.fingerprints.iter().any(|fp| {
            fp.pinned(props)
                .iter()
                .all(|(_, expected, actual)| expected == actual)
        })
    }

    /// Mismatching fields against the closest fingerprint (fewest
    /// mismatches); empty when the document is valid or nothing is registered.
    pub fn mismatches(&self, props: &DocumentProperties) -> Vec<FieldMismatch> {
        self.fingerprints
            .iter()
            .map(|fp| {
                fp.pinned(props)
                    .into_iter()
                    .filter(|(_, expected, actual)| expected != actual)
                    .map(|(field, expected, actual)| FieldMismatch {
                        field,
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .min_by_key(Vec::len)
            .unwrap_or_default()
    }
}
