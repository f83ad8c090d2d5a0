//! Opaque token key generation

use rand::RngCore;

/// Number of random bytes behind a token key
const TOKEN_BYTES: usize = 20;

/// Generate a new token key: 20 random bytes as 40 lowercase hex characters
pub fn generate_key() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
