//! Canonical request fingerprints.

use lodestar_core::intent::Intent;
use lodestar_core::models::Query;

/// Field separator; never appears in normalized text.
const SEPARATOR: &[u8] = &[0x1f];

/// blake3 over (normalized text, intent, canonical filters, weight version,
/// generation). The response limit is not part of it.
pub fn fingerprint(query: &Query, intent: Intent, weights_version: &str, generation: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(query.normalized_text().as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(intent.as_str().as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(query.filters().canonical().as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(weights_version.as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(&generation.to_le_bytes());
    hasher.finalize().to_hex().to_string()
}
