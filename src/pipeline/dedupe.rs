//! Content fingerprinting and duplicate removal

use std::collections::HashSet;
use std::fmt;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::models::JobRecord;

/// Deduplication identity of a posting
///
/// Digest of `company|title|location|url`. Source and posted date are not
/// part of the identity, so the same posting seen on two boards collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(record: &JobRecord) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(
            format!(
                "{}|{}|{}|{}",
                record.company, record.title, record.location, record.url
            )
            .as_bytes(),
        );
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Keep the first occurrence of each fingerprint, in input order
pub fn dedupe(records: impl IntoIterator<Item = JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    let mut duplicate_count = 0;

    let unique: Vec<JobRecord> = records
        .into_iter()
        .filter(|record| {
            let fingerprint = Fingerprint::of(record);
            if seen.insert(fingerprint) {
                true
            } else {
                duplicate_count += 1;
                debug!(
                    "Skipping duplicate '{}' at {} from {} ({})",
                    record.title, record.company, record.source, fingerprint
                );
                false
            }
        })
        .collect();

    if duplicate_count > 0 {
        info!("Removed {} duplicate postings", duplicate_count);
    }

    unique
}
