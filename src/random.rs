// ABOUTME: Randomness source for generator directives in variable defaults.
// ABOUTME: Backed by OS entropy; never deterministic across runs.

use rand::RngCore;
use rand::rngs::OsRng;

/// Generate a lowercase hex string from `byte_count` random bytes.
/// The result is exactly `2 * byte_count` characters long.
pub fn random_hex(byte_count: usize) -> String {
    let mut bytes = vec![0u8; byte_count];
    OsRng.fill_bytes(&mut bytes);

    let mut out = String::with_capacity(byte_count * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
