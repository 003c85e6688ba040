use crate::{crypto::SignatureScheme, types::KeyId};
use thiserror::Error;

/// Result type for trust-metadata signing
pub type TufSigResult<T> = std::result::Result<T, TufSigError>;

/// Error type for trust-metadata signing
#[derive(Error, Debug)]
pub enum TufSigError {
  /* ----- Key service errors ----- */
  /// Key absent from every store consulted
  #[error("key {0} not found")]
  KeyNotFound(KeyId),
  /// Every registered store rejected the write
  #[error("no writable key store accepted the write")]
  NoWritableStore,
  /// Write attempted against a read-only store
  #[error("key store {0} is read-only")]
  ReadOnly(String),
  /// Store cannot hold keys of the requested scheme
  #[error("signature scheme {0} is not supported by this store")]
  AlgorithmUnsupported(SignatureScheme),
  /// Root key import rejected by every store
  #[error("root key import rejected: {0}")]
  ImportRejected(String),
  /// Backend storage fault, distinct from key absence
  #[error("key store failure: {0}")]
  Store(String),

  /* ----- Crypto errors ----- */
  /// Scheme name outside the recognized set
  #[error("unrecognized signature scheme name: {0}")]
  UnknownScheme(String),
  /// Signature declares a different scheme than the key
  #[error("scheme mismatch: key declares {key}, signature declares {signature}")]
  SchemeMismatch {
    key: SignatureScheme,
    signature: SignatureScheme,
  },
  /// Malformed key material
  #[error("failed to decode key material: {0}")]
  DecodeError(String),
  /// Key material could not be serialized
  #[error("failed to encode key material: {0}")]
  EncodeError(String),
  /// Key generation fault
  #[error("key generation failed: {0}")]
  KeygenFailed(String),
  /// Signing backend fault
  #[error("signing failed: {0}")]
  SigningFailed(String),
  /// Signature rejected by the scheme's verifier
  #[error("invalid signature: {0}")]
  InvalidSignature(String),
}
