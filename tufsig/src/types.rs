use crate::crypto::SignatureScheme;

/* -------------------------------- */
/// Content-derived key identifier: the base64url-encoded SHA-256 digest of
/// the public key's SPKI DER encoding. Equal encodings always yield equal ids,
/// independent of which store produced the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(String);

impl KeyId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for KeyId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<String> for KeyId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

impl From<&str> for KeyId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

/* -------------------------------- */
/// Trust function a key serves, e.g. "root" or "targets". A key carries
/// exactly one role per store entry; the label set is open beyond the four
/// well-known top-level roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn root() -> Self {
    Self("root".to_string())
  }

  pub fn targets() -> Self {
    Self("targets".to_string())
  }

  pub fn snapshot() -> Self {
    Self("snapshot".to_string())
  }

  pub fn timestamp() -> Self {
    Self("timestamp".to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_root(&self) -> bool {
    self.0 == "root"
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for Role {
  fn from(name: &str) -> Self {
    Self(name.to_string())
  }
}

/* -------------------------------- */
/// A single signature over a payload, tagged with the signing key's id and
/// declared scheme. The scheme tag is what the verifier checks against the
/// key's own scheme before any cryptographic work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
  /// id of the key that produced this signature
  pub key_id: KeyId,
  /// scheme the signature claims to be produced under
  pub scheme: SignatureScheme,
  /// raw signature bytes
  pub signature: Vec<u8>,
}
