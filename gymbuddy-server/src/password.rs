//! PBKDF2-HMAC-SHA256 password hashes.
//!
//! Encoded as `pbkdf2_sha256$<iterations>$<salt>$<hash_b64>`, the layout
//! Django uses, so accounts carried over from an existing deployment verify
//! unchanged. The iteration count is read back from each stored hash.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 22;
const HASH_LEN: usize = 32;

/// Work factor for newly created hashes
pub const DEFAULT_ITERATIONS: u32 = 600_000;

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    out
}

fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

pub fn hash_password_with_iterations(password: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    let salt = generate_salt();
    let hash = derive(password, &salt, iterations);
    format!("{ALGORITHM}${iterations}${salt}${}", STANDARD.encode(hash))
}

pub fn hash_password(password: &str) -> String {
    hash_password_with_iterations(password, DEFAULT_ITERATIONS)
}

/// Check a password against an encoded hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if algorithm != ALGORITHM || salt.is_empty() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let Ok(expected) = STANDARD.decode(expected) else {
        return false;
    };

    let actual = derive(password, salt, iterations);
    constant_time_eq::constant_time_eq(&actual, &expected)
}
