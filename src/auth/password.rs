use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

// Argon2::default() is Argon2id, m = 19 MiB, t = 2, p = 1.

lazy_static! {
    /// Hash checked when the email is unknown, so both rejection paths cost the same.
    static ref DUMMY_HASH: anyhow::Result<String> = hash_password("staffdir-timing-equalizer");
}

/// Builds the dummy hash at startup so no login pays for it. Fails if
/// hashing itself is broken.
pub fn prepare_dummy_hash() -> anyhow::Result<()> {
    match &*DUMMY_HASH {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow::anyhow!("dummy password hash unavailable: {e}")),
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Burns one verification against the dummy hash. Always "fails".
pub fn verify_dummy(plain: &str) {
    if let Ok(hash) = &*DUMMY_HASH {
        let _ = verify_password(plain, hash);
    }
}
