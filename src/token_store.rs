//! Encrypted per-user storage for the Tinkoff API token
//!
//! The token is the only secret this client holds, so it never touches disk
//! in the clear: files are AES-256-GCM encrypted with an Argon2-derived key.
//! File layout: salt (16) + nonce (12) + ciphertext.

use aes_gcm::{
    aead::{
        rand_core::{OsRng, RngCore},
        Aead, KeyInit,
    },
    Aes256Gcm, Key, Nonce,
};
use anyhow::{anyhow, Result};
use argon2::Argon2;
use std::path::PathBuf;

use crate::data_paths::DataPaths;

/// Get the path to a user's token file
fn token_path(data_paths: &DataPaths, user_id: i64) -> Result<PathBuf> {
    let auth_dir = data_paths.auth();
    std::fs::create_dir_all(&auth_dir)?;
    Ok(auth_dir.join(format!("tinkoff_token_{}.enc", user_id)))
}

/// Get or prompt for passphrase
pub fn get_passphrase() -> Result<String> {
    // First check environment variable
    if let Ok(passphrase) = std::env::var("TINKVIEW_PASSPHRASE") {
        return Ok(passphrase);
    }

    // Otherwise prompt
    let passphrase = rpassword::prompt_password("Enter passphrase for token encryption: ")?;
    if passphrase.is_empty() {
        return Err(anyhow!("Passphrase cannot be empty"));
    }
    Ok(passphrase)
}

/// Derive encryption key from passphrase
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Key<Aes256Gcm>> {
    let mut key_bytes = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key_bytes)
        .map_err(|e| anyhow!("Failed to derive key: {}", e))?;
    Ok(Key::<Aes256Gcm>::from_slice(&key_bytes).clone())
}

/// Save the token to an encrypted per-user file
pub fn save_token(
    data_paths: &DataPaths,
    user_id: i64,
    token: &str,
    passphrase: &str,
) -> Result<()> {
    let path = token_path(data_paths, user_id)?;

    // Generate salt and nonce
    let mut salt = [0u8; 16];
    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce_bytes);

    // Derive key and create cipher
    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new(&key);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // Encrypt
    let ciphertext = cipher
        .encrypt(nonce, token.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    // Write salt + nonce + ciphertext
    let mut output = Vec::new();
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);

    std::fs::write(path, output)?;
    Ok(())
}

/// Load the cached token, or None when the user has never stored one
pub fn load_token(
    data_paths: &DataPaths,
    user_id: i64,
    passphrase: &str,
) -> Result<Option<String>> {
    let path = token_path(data_paths, user_id)?;
    if !path.exists() {
        return Ok(None);
    }

    let encrypted = std::fs::read(&path)?;

    if encrypted.len() < 28 {
        // 16 (salt) + 12 (nonce) = 28
        return Err(anyhow!("Invalid encrypted file format"));
    }

    // Extract components
    let salt = &encrypted[..16];
    let nonce_bytes = &encrypted[16..28];
    let ciphertext = &encrypted[28..];

    // Derive key and create cipher
    let key = derive_key(passphrase, salt)?;
    let cipher = Aes256Gcm::new(&key);
    let nonce = Nonce::from_slice(nonce_bytes);

    // Decrypt
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| anyhow!("Decryption failed. Wrong passphrase?"))?;

    let token = String::from_utf8(plaintext)
        .map_err(|_| anyhow!("Decrypted token is not valid UTF-8"))?;
    Ok(Some(token))
}

/// Remove the stored token, if any
pub fn clear_token(data_paths: &DataPaths, user_id: i64) -> Result<()> {
    let path = token_path(data_paths, user_id)?;
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_token_round_trip() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());

        save_token(&data_paths, 42, "t.secret-token", "pass").unwrap();
        let loaded = load_token(&data_paths, 42, "pass").unwrap();
        assert_eq!(loaded.as_deref(), Some("t.secret-token"));
    }

    #[test]
    fn test_missing_token_is_none() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());

        assert!(load_token(&data_paths, 42, "pass").unwrap().is_none());
    }

    #[test]
    fn test_wrong_passphrase_fails() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());

        save_token(&data_paths, 42, "t.secret-token", "pass").unwrap();
        assert!(load_token(&data_paths, 42, "other").is_err());
    }

    #[test]
    fn test_token_file_is_not_plaintext() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());

        save_token(&data_paths, 42, "t.secret-token", "pass").unwrap();
        let raw = std::fs::read(data_paths.auth().join("tinkoff_token_42.enc")).unwrap();
        let haystack = String::from_utf8_lossy(&raw);
        assert!(!haystack.contains("secret-token"));
    }

    #[test]
    fn test_clear_token() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());

        save_token(&data_paths, 42, "t.secret-token", "pass").unwrap();
        clear_token(&data_paths, 42).unwrap();
        assert!(load_token(&data_paths, 42, "pass").unwrap().is_none());
    }
}
