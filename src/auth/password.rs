use crate::error::WaypostError;

/// Work factor for newly generated hashes. Existing stored hashes keep
/// whatever cost they were created with; `verify` reads it from the
/// hash string itself.
pub const HASH_COST: u32 = 10;

/// Compare a plaintext password against a stored bcrypt hash.
///
/// A malformed or truncated stored hash verifies as `false` rather
/// than surfacing an error; login failure handling stays in one path.
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

/// Hash a plaintext password with the given bcrypt cost.
pub fn hash(plaintext: &str, cost: u32) -> Result<String, WaypostError> {
    Ok(bcrypt::hash(plaintext, cost)?)
}
