use crate::{
  crypto::{PrivateKey, PublicKey, SecretKey, SignatureScheme, SigningKey},
  error::{TufSigError, TufSigResult},
  keystore::KeyStore,
  trace::*,
  types::{KeyId, Role, Signature},
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::{io, sync::Arc};
use zeroize::Zeroizing;

/// Unified signing and key service over an ordered sequence of stores.
///
/// Store position is priority: reads consult stores front to back and the
/// first hit wins; writes land in the first store that accepts them. The
/// list is fixed at construction, so the service itself holds no mutable
/// state and is freely shared across threads.
///
/// The same key id can exist in more than one store (imports make this
/// reachable). That duplication is accepted, not rejected: reads and
/// `remove_key` resolve to the highest-priority owner, and role
/// disagreements between stores resolve the same way.
pub struct CryptoService {
  stores: Vec<Arc<dyn KeyStore>>,
}

impl CryptoService {
  pub fn new(stores: Vec<Arc<dyn KeyStore>>) -> Self {
    Self { stores }
  }

  /// Generate a key for `role`, placed in the first store that accepts the
  /// write. Stores that are read-only or reject the scheme are skipped; if
  /// every store rejects, the call fails with `NoWritableStore`.
  pub fn create(&self, role: &Role, scheme: SignatureScheme) -> TufSigResult<PublicKey> {
    for store in &self.stores {
      match store.create(role, scheme) {
        Ok(public) => {
          debug!(store = store.name(), role = %role, %scheme, "created key");
          return Ok(public);
        }
        Err(TufSigError::ReadOnly(_)) | Err(TufSigError::AlgorithmUnsupported(_)) => continue,
        Err(e) => return Err(e),
      }
    }
    Err(TufSigError::NoWritableStore)
  }

  /// Fetch the public key, consulting stores in priority order.
  /// `Ok(None)` means no store knows the key; it is not a failure.
  pub fn get_key(&self, key_id: &KeyId) -> TufSigResult<Option<PublicKey>> {
    for store in &self.stores {
      if let Some(public) = store.get(key_id)? {
        return Ok(Some(public));
      }
    }
    Ok(None)
  }

  /// Fetch a signing handle and role, consulting stores in priority order.
  /// The handle keeps the material inside the owning store's entry; nothing
  /// is cached or logged on this path.
  pub fn get_private_key(&self, key_id: &KeyId) -> TufSigResult<Option<(PrivateKey, Role)>> {
    for store in &self.stores {
      if let Some(found) = store.get_private(key_id)? {
        return Ok(Some(found));
      }
    }
    Ok(None)
  }

  /// Delete the key from its highest-priority owner. A copy of the same key
  /// held by a lower-priority store is left in place.
  pub fn remove_key(&self, key_id: &KeyId) -> TufSigResult<()> {
    for store in &self.stores {
      match store.remove(key_id) {
        Err(TufSigError::KeyNotFound(_)) => continue,
        Ok(()) => {
          debug!(store = store.name(), %key_id, "removed key");
          return Ok(());
        }
        Err(e) => return Err(e),
      }
    }
    Err(TufSigError::KeyNotFound(key_id.clone()))
  }

  /// Ids of all keys serving `role`, across every store, deduplicated.
  /// Order is store priority first, then each store's own order.
  pub fn list_keys(&self, role: &Role) -> TufSigResult<Vec<KeyId>> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for store in &self.stores {
      for key_id in store.list(role)? {
        if seen.insert(key_id.clone()) {
          out.push(key_id);
        }
      }
    }
    Ok(out)
  }

  /// Every key the service can reach, mapped to its role. When stores
  /// disagree on a key's role, the higher-priority store's entry wins.
  pub fn list_all_keys(&self) -> TufSigResult<IndexMap<KeyId, Role>> {
    let mut out = IndexMap::new();
    for store in &self.stores {
      for (key_id, role) in store.list_all()? {
        out.entry(key_id).or_insert(role);
      }
    }
    Ok(out)
  }

  /// Import a root key from a byte stream holding one PKCS#8 pem private
  /// key. The key lands in the highest-priority store that accepts it; the
  /// role is pinned to `root` by contract. A stream that does not decode to
  /// a private key fails with `DecodeError` and changes nothing.
  pub fn import_root_key<R: io::Read>(&self, mut source: R) -> TufSigResult<PublicKey> {
    let mut raw = Zeroizing::new(Vec::new());
    source
      .read_to_end(&mut raw)
      .map_err(|e| TufSigError::DecodeError(format!("reading key source: {e}")))?;
    let pem =
      std::str::from_utf8(&raw).map_err(|_| TufSigError::DecodeError("key source is not utf-8 pem".to_string()))?;
    let secret = SecretKey::from_pem(pem)?;

    let role = Role::root();
    for store in &self.stores {
      match store.import(&role, &secret) {
        Ok(public) => {
          debug!(store = store.name(), scheme = %SigningKey::scheme(&secret), "imported root key");
          return Ok(public);
        }
        Err(TufSigError::ReadOnly(_)) | Err(TufSigError::AlgorithmUnsupported(_)) => continue,
        Err(e) => return Err(e),
      }
    }
    Err(TufSigError::ImportRejected(
      "no writable store accepted the key".to_string(),
    ))
  }

  /// Sign `payload` with every listed key, in the listed order.
  ///
  /// The call is all-or-nothing: every key id is resolved before the first
  /// signature is produced, and any failure aborts the whole call. A partial
  /// signature set is never returned, because a metadata document carrying
  /// one is unsafe to publish. The payload is signed exactly as given;
  /// canonicalization belongs to the caller.
  pub fn sign(&self, key_ids: &[KeyId], payload: &[u8]) -> TufSigResult<Vec<Signature>> {
    let mut keys = Vec::with_capacity(key_ids.len());
    for key_id in key_ids {
      let (private, _role) = self
        .get_private_key(key_id)?
        .ok_or_else(|| TufSigError::KeyNotFound(key_id.clone()))?;
      keys.push(private);
    }

    let mut signatures = Vec::with_capacity(keys.len());
    for (key_id, key) in key_ids.iter().zip(&keys) {
      let raw = key.sign(payload)?;
      signatures.push(Signature {
        key_id: key_id.clone(),
        scheme: SigningKey::scheme(key),
        signature: raw,
      });
    }
    Ok(signatures)
  }
}
