//! Statement fingerprints for log correlation and change detection.

use sha2::{Digest, Sha256};

/// SHA-256 of the SQL text, hex encoded.
///
/// Identical SQL always yields the same fingerprint, so two render passes
/// over the same filters can be compared without diffing the statements.
pub fn fingerprint_sql(sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sql.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_consistency() {
        let sql = "SELECT 1";
        assert_eq!(fingerprint_sql(sql), fingerprint_sql(sql));
        assert_eq!(fingerprint_sql(sql).len(), 64);
    }

    #[test]
    fn test_whitespace_changes_fingerprint() {
        assert_ne!(fingerprint_sql("SELECT 1"), fingerprint_sql("SELECT  1"));
    }
}
