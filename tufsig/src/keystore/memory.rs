use super::KeyStore;
use crate::{
  crypto::{PrivateKey, PublicKey, SecretKey, SignatureScheme, SigningKey, VerifyingKey},
  error::{TufSigError, TufSigResult},
  trace::*,
  types::{KeyId, Role},
};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};

struct Entry {
  role: Role,
  public: PublicKey,
  secret: Arc<SecretKey>,
}

/// Volatile in-process store. Key material lives only as long as the store;
/// a remote-signer-backed variant would hold the same map of public halves
/// and delegate `create`/`sign` over the wire behind the same trait.
///
/// Entries keep insertion order, so `list`/`list_all` are stable across
/// calls. Concurrent writes racing on the same key id are last-writer-wins.
pub struct MemoryStore {
  label: String,
  schemes: Option<Vec<SignatureScheme>>,
  entries: RwLock<IndexMap<KeyId, Entry>>,
}

impl MemoryStore {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      schemes: None,
      entries: RwLock::new(IndexMap::new()),
    }
  }

  /// A store restricted to a subset of schemes. `create` and `import` of any
  /// other scheme fail with `AlgorithmUnsupported`.
  pub fn with_schemes(label: impl Into<String>, schemes: &[SignatureScheme]) -> Self {
    Self {
      label: label.into(),
      schemes: Some(schemes.to_vec()),
      entries: RwLock::new(IndexMap::new()),
    }
  }

  fn check_scheme(&self, scheme: SignatureScheme) -> TufSigResult<()> {
    match &self.schemes {
      Some(schemes) if !schemes.contains(&scheme) => Err(TufSigError::AlgorithmUnsupported(scheme)),
      _ => Ok(()),
    }
  }

  fn insert(&self, role: &Role, secret: SecretKey) -> TufSigResult<PublicKey> {
    let public = secret.public_key();
    let key_id = public.key_id()?;
    debug!(store = %self.label, key_id = %key_id, role = %role, "retaining key");
    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(
        key_id,
        Entry {
          role: role.clone(),
          public: public.clone(),
          secret: Arc::new(secret),
        },
      );
    Ok(public)
  }
}

impl KeyStore for MemoryStore {
  fn name(&self) -> &str {
    &self.label
  }

  fn create(&self, role: &Role, scheme: SignatureScheme) -> TufSigResult<PublicKey> {
    self.check_scheme(scheme)?;
    let secret = SecretKey::generate(scheme)?;
    self.insert(role, secret)
  }

  fn get(&self, key_id: &KeyId) -> TufSigResult<Option<PublicKey>> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key_id).map(|entry| entry.public.clone()))
  }

  fn get_private(&self, key_id: &KeyId) -> TufSigResult<Option<(PrivateKey, Role)>> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    Ok(
      entries
        .get(key_id)
        .map(|entry| (PrivateKey::from(entry.secret.clone()), entry.role.clone())),
    )
  }

  fn remove(&self, key_id: &KeyId) -> TufSigResult<()> {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    // shift_remove keeps the listing order of the remaining entries
    match entries.shift_remove(key_id) {
      Some(_) => Ok(()),
      None => Err(TufSigError::KeyNotFound(key_id.clone())),
    }
  }

  fn list(&self, role: &Role) -> TufSigResult<Vec<KeyId>> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    Ok(
      entries
        .iter()
        .filter(|(_, entry)| entry.role == *role)
        .map(|(key_id, _)| key_id.clone())
        .collect(),
    )
  }

  fn list_all(&self) -> TufSigResult<IndexMap<KeyId, Role>> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    Ok(
      entries
        .iter()
        .map(|(key_id, entry)| (key_id.clone(), entry.role.clone()))
        .collect(),
    )
  }

  fn import(&self, role: &Role, key: &SecretKey) -> TufSigResult<PublicKey> {
    self.check_scheme(SigningKey::scheme(key))?;
    self.insert(role, key.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn create_then_get_every_scheme() {
    let store = MemoryStore::new("mem");
    for scheme in SignatureScheme::all() {
      let pk = store.create(&Role::targets(), *scheme).unwrap();
      let id = pk.key_id().unwrap();
      assert_eq!(store.get(&id).unwrap(), Some(pk));
      let (private, role) = store.get_private(&id).unwrap().unwrap();
      assert_eq!(role, Role::targets());
      assert_eq!(SigningKey::scheme(&private), *scheme);
    }
  }

  #[test]
  fn get_unknown_key_is_none() {
    let store = MemoryStore::new("mem");
    assert_eq!(store.get(&KeyId::from("missing")).unwrap(), None);
    assert!(store.get_private(&KeyId::from("missing")).unwrap().is_none());
  }

  #[test]
  fn remove_deletes_and_missing_remove_fails() {
    let store = MemoryStore::new("mem");
    let pk = store.create(&Role::root(), SignatureScheme::Ed25519).unwrap();
    let id = pk.key_id().unwrap();
    store.remove(&id).unwrap();
    assert_eq!(store.get(&id).unwrap(), None);
    assert!(matches!(
      store.remove(&id),
      Err(TufSigError::KeyNotFound(missing)) if missing == id
    ));
  }

  #[test]
  fn list_is_role_scoped_and_ordered() {
    let store = MemoryStore::new("mem");
    let a = store
      .create(&Role::root(), SignatureScheme::Ed25519)
      .unwrap()
      .key_id()
      .unwrap();
    let b = store
      .create(&Role::targets(), SignatureScheme::Ed25519)
      .unwrap()
      .key_id()
      .unwrap();
    let c = store
      .create(&Role::root(), SignatureScheme::EcdsaP256Sha256)
      .unwrap()
      .key_id()
      .unwrap();

    assert_eq!(store.list(&Role::root()).unwrap(), vec![a.clone(), c.clone()]);
    assert_eq!(store.list(&Role::targets()).unwrap(), vec![b.clone()]);
    assert!(store.list(&Role::timestamp()).unwrap().is_empty());

    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.get(&a), Some(&Role::root()));
    assert_eq!(all.get(&b), Some(&Role::targets()));
    assert_eq!(all.get(&c), Some(&Role::root()));
  }

  #[test]
  fn scheme_restriction_is_enforced() {
    let store = MemoryStore::with_schemes("ed-only", &[SignatureScheme::Ed25519]);
    store.create(&Role::root(), SignatureScheme::Ed25519).unwrap();
    assert!(matches!(
      store.create(&Role::root(), SignatureScheme::EcdsaP256Sha256),
      Err(TufSigError::AlgorithmUnsupported(SignatureScheme::EcdsaP256Sha256))
    ));
    let key = SecretKey::generate(SignatureScheme::EcdsaP256Sha256).unwrap();
    assert!(matches!(
      store.import(&Role::root(), &key),
      Err(TufSigError::AlgorithmUnsupported(_))
    ));
  }

  #[test]
  fn import_retains_under_given_role() {
    let store = MemoryStore::new("mem");
    let key = SecretKey::generate(SignatureScheme::EcdsaP384Sha384).unwrap();
    let pk = store.import(&Role::root(), &key).unwrap();
    let id = pk.key_id().unwrap();
    let (private, role) = store.get_private(&id).unwrap().unwrap();
    assert_eq!(role, Role::root());
    assert_eq!(private.public_key(), pk);
  }
}
