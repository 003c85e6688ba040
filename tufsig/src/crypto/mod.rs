mod asymmetric;

use crate::{
  error::{TufSigError, TufSigResult},
  types::KeyId,
};

pub use asymmetric::{PrivateKey, PublicKey, SecretKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Signature schemes recognized by this crate. The set is closed: adding a
/// scheme changes security properties and is a compile-time decision, not a
/// runtime registration.
pub enum SignatureScheme {
  Ed25519,
  EcdsaP256Sha256,
  EcdsaP384Sha384,
  RsaPssSha256,
  RsaV15Sha256,
}

impl SignatureScheme {
  pub fn as_str(&self) -> &'static str {
    match self {
      SignatureScheme::Ed25519 => "ed25519",
      SignatureScheme::EcdsaP256Sha256 => "ecdsa-p256-sha256",
      SignatureScheme::EcdsaP384Sha384 => "ecdsa-p384-sha384",
      SignatureScheme::RsaPssSha256 => "rsa-pss-sha256",
      SignatureScheme::RsaV15Sha256 => "rsa-v1_5-sha256",
    }
  }

  /// All recognized schemes, in no particular order of preference.
  pub fn all() -> &'static [SignatureScheme] {
    &[
      SignatureScheme::Ed25519,
      SignatureScheme::EcdsaP256Sha256,
      SignatureScheme::EcdsaP384Sha384,
      SignatureScheme::RsaPssSha256,
      SignatureScheme::RsaV15Sha256,
    ]
  }
}

impl std::fmt::Display for SignatureScheme {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl core::str::FromStr for SignatureScheme {
  type Err = TufSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ed25519" => Ok(Self::Ed25519),
      "ecdsa-p256-sha256" => Ok(Self::EcdsaP256Sha256),
      "ecdsa-p384-sha384" => Ok(Self::EcdsaP384Sha384),
      "rsa-pss-sha256" => Ok(Self::RsaPssSha256),
      "rsa-v1_5-sha256" => Ok(Self::RsaV15Sha256),
      _ => Err(TufSigError::UnknownScheme(s.to_string())),
    }
  }
}

/// SigningKey trait
pub trait SigningKey {
  fn sign(&self, data: &[u8]) -> TufSigResult<Vec<u8>>;
  fn key_id(&self) -> TufSigResult<KeyId>;
  fn scheme(&self) -> SignatureScheme;
}

/// VerifyingKey trait
pub trait VerifyingKey {
  fn verify(&self, data: &[u8], signature: &[u8]) -> TufSigResult<()>;
  fn key_id(&self) -> TufSigResult<KeyId>;
  fn scheme(&self) -> SignatureScheme;
}
