//! At-rest encryption for metadata marked `encrypted`
//!
//! AES-256-GCM with a random 96-bit nonce per value. A sealed value is
//! `base64(nonce || ciphertext)`. The key comes from `PH24_STATE_KEY`
//! (base64, 32 bytes) or from `.ph24/state.key`, generated on first use.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ph24_module::HostError;
use rand::RngCore;
use std::path::Path;

pub const ENV_STATE_KEY: &str = "PH24_STATE_KEY";
pub const KEY_FILE: &str = "state.key";

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

pub struct StateCipher {
    key: [u8; KEY_SIZE],
}

impl StateCipher {
    /// Key from `PH24_STATE_KEY`, else the key file in `state_dir`
    pub async fn load(state_dir: &Path) -> Result<Self, HostError> {
        if let Ok(encoded) = std::env::var(ENV_STATE_KEY) {
            if !encoded.trim().is_empty() {
                return Self::from_base64(&encoded);
            }
        }

        let path = state_dir.join(KEY_FILE);
        if path.exists() {
            let encoded = tokio::fs::read_to_string(&path).await?;
            return Self::from_base64(&encoded);
        }

        let cipher = Self::generate();
        tokio::fs::create_dir_all(state_dir).await?;
        tokio::fs::write(&path, BASE64.encode(cipher.key)).await?;
        tracing::debug!("Generated state key at {}", path.display());
        Ok(cipher)
    }

    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_base64(encoded: &str) -> Result<Self, HostError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| HostError::Storage(format!("State key is not valid base64: {}", e)))?;
        let key: [u8; KEY_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            HostError::Storage(format!(
                "State key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, HostError> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| HostError::Storage(format!("Encryption failed: {}", e)))?;

        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(sealed))
    }

    pub fn open(&self, sealed: &str) -> Result<String, HostError> {
        let bytes = BASE64
            .decode(sealed)
            .map_err(|e| HostError::Storage(format!("Encrypted value is not valid base64: {}", e)))?;
        if bytes.len() < NONCE_SIZE {
            return Err(HostError::Storage("Encrypted value is truncated".to_string()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| HostError::Storage(format!("Decryption failed: {}", e)))?;
        String::from_utf8(plaintext)
            .map_err(|e| HostError::Storage(format!("Decrypted value is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_and_open() {
        let cipher = StateCipher::generate();

        let sealed = cipher.seal("aN2WZ^x0y%P#iy$x").unwrap();
        assert_ne!(sealed, "aN2WZ^x0y%P#iy$x");
        assert_ne!(sealed, cipher.seal("aN2WZ^x0y%P#iy$x").unwrap());
        assert_eq!(cipher.open(&sealed).unwrap(), "aN2WZ^x0y%P#iy$x");
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = StateCipher::generate().seal("secret").unwrap();
        assert!(StateCipher::generate().open(&sealed).is_err());
    }

    #[test]
    fn test_key_must_be_32_bytes() {
        assert!(StateCipher::from_base64(&BASE64.encode([7u8; 16])).is_err());
        assert!(StateCipher::from_base64("not base64!").is_err());
        assert!(StateCipher::from_base64(&BASE64.encode([7u8; 32])).is_ok());
    }

    #[tokio::test]
    async fn test_key_file_is_reused() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_dir = temp_dir.path().join(".ph24");

        let first = StateCipher::load(&state_dir).await.unwrap();
        let sealed = first.seal("secret").unwrap();
        assert!(state_dir.join(KEY_FILE).exists());

        let second = StateCipher::load(&state_dir).await.unwrap();
        assert_eq!(second.open(&sealed).unwrap(), "secret");
    }
}
