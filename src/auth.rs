/*!
 * Credential handling.
 *
 * The only credential operation in the service is one-way hashing of user
 * passwords before they reach the store; there is no login endpoint, so no
 * comparison path exists here. The plain password is dropped as soon as the
 * hash is produced.
 */

use crate::error::{AppError, AppResult};

/// Fixed bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}
