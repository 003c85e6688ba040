use thiserror::Error;
use tufsig::prelude::TufSigError;

/// Result type for the on-disk key store
pub type KeyFileResult<T> = std::result::Result<T, KeyFileError>;

/// Error type for the on-disk key store
#[derive(Error, Debug)]
pub enum KeyFileError {
  /// Filesystem fault
  #[error("key store i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// File present but not a usable key document
  #[error("invalid key file {path}: {reason}")]
  InvalidKeyFile { path: String, reason: String },

  /// Encrypted document rejected the passphrase, or the ciphertext is corrupt
  #[error("failed to decrypt key file: {0}")]
  Decrypt(String),

  /// Key material could not be encrypted for rest
  #[error("failed to encrypt key material: {0}")]
  Encrypt(String),

  /// Role labels become directory names and must be path-safe
  #[error("role {0:?} cannot name a key directory")]
  InvalidRole(String),

  /// Inherited from TufSigError
  #[error("TufSigError: {0}")]
  TufSig(#[from] TufSigError),
}

impl From<KeyFileError> for TufSigError {
  fn from(e: KeyFileError) -> Self {
    match e {
      KeyFileError::TufSig(inner) => inner,
      other => TufSigError::Store(other.to_string()),
    }
  }
}
