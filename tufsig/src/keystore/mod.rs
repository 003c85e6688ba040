mod memory;

use crate::{
  crypto::{PrivateKey, PublicKey, SecretKey, SignatureScheme},
  error::{TufSigError, TufSigResult},
  types::{KeyId, Role},
};
use indexmap::IndexMap;

pub use memory::MemoryStore;

/// A single backend holding key material and per-key role metadata. A store
/// must be read-after-write consistent for its own keys; everything else
/// (encryption at rest, remote transport) is the backend's concern.
///
/// Absence is reported as `Ok(None)`, distinct from a backend fault, which is
/// an `Err`. Callers treat the two differently: absence means "unknown key",
/// a fault means the store could not answer.
pub trait KeyStore: Send + Sync {
  /// Diagnostic label used in logs and read-only errors.
  fn name(&self) -> &str;

  /// Generate a key for `role` and retain it.
  fn create(&self, role: &Role, scheme: SignatureScheme) -> TufSigResult<PublicKey>;

  /// Fetch the public half, if this store holds the key.
  fn get(&self, key_id: &KeyId) -> TufSigResult<Option<PublicKey>>;

  /// Fetch a signing handle and the key's role, if this store holds the key.
  fn get_private(&self, key_id: &KeyId) -> TufSigResult<Option<(PrivateKey, Role)>>;

  /// Delete the key. Fails with `KeyNotFound` if this store does not hold it.
  fn remove(&self, key_id: &KeyId) -> TufSigResult<()>;

  /// Ids of all keys held for `role`, in stable per-store order.
  fn list(&self, role: &Role) -> TufSigResult<Vec<KeyId>>;

  /// All keys held by this store, mapped to their roles.
  fn list_all(&self) -> TufSigResult<IndexMap<KeyId, Role>>;

  /// Retain an externally supplied key under `role`.
  fn import(&self, role: &Role, key: &SecretKey) -> TufSigResult<PublicKey>;
}

/// Write-restricted view over another store: reads pass through, every
/// mutation fails with `ReadOnly`.
pub struct ReadOnly<S> {
  inner: S,
}

impl<S: KeyStore> ReadOnly<S> {
  pub fn new(inner: S) -> Self {
    Self { inner }
  }
}

impl<S: KeyStore> KeyStore for ReadOnly<S> {
  fn name(&self) -> &str {
    self.inner.name()
  }

  fn create(&self, _role: &Role, _scheme: SignatureScheme) -> TufSigResult<PublicKey> {
    Err(TufSigError::ReadOnly(self.inner.name().to_string()))
  }

  fn get(&self, key_id: &KeyId) -> TufSigResult<Option<PublicKey>> {
    self.inner.get(key_id)
  }

  fn get_private(&self, key_id: &KeyId) -> TufSigResult<Option<(PrivateKey, Role)>> {
    self.inner.get_private(key_id)
  }

  fn remove(&self, _key_id: &KeyId) -> TufSigResult<()> {
    Err(TufSigError::ReadOnly(self.inner.name().to_string()))
  }

  fn list(&self, role: &Role) -> TufSigResult<Vec<KeyId>> {
    self.inner.list(role)
  }

  fn list_all(&self) -> TufSigResult<IndexMap<KeyId, Role>> {
    self.inner.list_all()
  }

  fn import(&self, _role: &Role, _key: &SecretKey) -> TufSigResult<PublicKey> {
    Err(TufSigError::ReadOnly(self.inner.name().to_string()))
  }
}
