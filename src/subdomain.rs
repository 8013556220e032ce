//! Random subdomain generation
//!
//! A first publish with no configured subdomain gets a generated one: eight
//! lowercase alphanumeric characters, about 41 bits of entropy. The result
//! is persisted so every later run publishes to the same site.

use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const LENGTH: usize = 8;

/// Generate a random subdomain label.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
