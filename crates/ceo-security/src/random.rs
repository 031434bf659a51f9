//! One-time tokens and numeric codes.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use std::fmt::Write;

/// Number of random bytes behind email verification, reset and invitation tokens.
const TOKEN_BYTES: usize = 32;

/// Generates a 64-character lowercase hex token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Generates a six-digit verification code (100000..=999999).
#[must_use]
pub fn generate_verification_code() -> String {
    (100_000 + OsRng.next_u32() % 900_000).to_string()
}
