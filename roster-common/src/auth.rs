//! Password and session-token primitives
//!
//! The service password is stored in the settings table as a salted
//! SHA-256 hash, bootstrapped from the `AUTH_PASSWORD` environment
//! variable on first run. Session tokens are opaque random values held in
//! process memory by the service.

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::Result;

const HASH_KEY: &str = "auth_password_hash";
const SALT_KEY: &str = "auth_password_salt";

/// Password used when `AUTH_PASSWORD` is unset. Single-operator tool;
/// deployments are expected to override it.
const DEFAULT_PASSWORD: &str = "1234";

pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex_encode(&bytes)
}

/// Opaque random session token (64 hex chars)
pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

async fn put_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store the salted password hash if none exists yet. The plaintext comes
/// from `AUTH_PASSWORD` (or the compiled default) and is never persisted.
pub async fn init_auth_password(pool: &SqlitePool) -> Result<()> {
    if get_setting(pool, HASH_KEY).await?.is_some() {
        return Ok(());
    }
    let password = std::env::var("AUTH_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    let salt = generate_salt();
    let hash = hash_password(&salt, &password);
    put_setting(pool, SALT_KEY, &salt).await?;
    put_setting(pool, HASH_KEY, &hash).await?;
    Ok(())
}

/// Check a login attempt against the stored hash. A database without a
/// bootstrapped password rejects every attempt.
pub async fn verify_password(pool: &SqlitePool, candidate: &str) -> Result<bool> {
    let (Some(hash), Some(salt)) = (
        get_setting(pool, HASH_KEY).await?,
        get_setting(pool, SALT_KEY).await?,
    ) else {
        return Ok(false);
    };
    Ok(hash_password(&salt, candidate) == hash)
}
