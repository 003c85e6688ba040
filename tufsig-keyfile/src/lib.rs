//! # tufsig-keyfile
//!
//! `tufsig-keyfile` is a persistent backend for `tufsig` key services. Each
//! key lives in its own PKCS#8 document, encrypted at rest under a store
//! passphrase (PBES2) and laid out as `<root>/<role>/<key_id>.<scheme>.pem`.
//!
//! The store conforms to the `tufsig` `KeyStore` trait, so it slots into a
//! `CryptoService` alongside volatile stores at any priority position.
//! Material is decrypted only when a key is actually fetched for use.

mod error;
mod store;

pub use error::{KeyFileError, KeyFileResult};
pub use store::KeyFileStore;
pub use tufsig::prelude;

/* ----------------------------------------------------------------- */
#[cfg(test)]
mod tests {
  use super::prelude::*;
  use crate::KeyFileStore;
  use std::sync::Arc;

  /// The on-disk store participates in a multi-store service: creates land
  /// in it when it has priority, imports respect priority order, and keys it
  /// holds sign alongside volatile ones.
  #[test]
  fn test_keyfile_store_inside_a_service() {
    let dir = tempfile::tempdir().unwrap();
    let disk = Arc::new(KeyFileStore::open(dir.path(), "store passphrase").unwrap());
    let memory = Arc::new(MemoryStore::new("mem"));
    let service = CryptoService::new(vec![disk.clone(), memory.clone()]);

    let disk_id = service
      .create(&Role::targets(), SignatureScheme::Ed25519)
      .unwrap()
      .key_id()
      .unwrap();
    assert!(disk.get(&disk_id).unwrap().is_some());
    assert!(memory.get(&disk_id).unwrap().is_none());

    let imported = SecretKey::generate(SignatureScheme::EcdsaP256Sha256).unwrap();
    let pem = imported.to_pem().unwrap();
    let root_id = service.import_root_key(pem.as_bytes()).unwrap().key_id().unwrap();
    assert!(disk.get(&root_id).unwrap().is_some());

    let payload = b"snapshot metadata";
    let signatures = service.sign(&[root_id.clone(), disk_id.clone()], payload).unwrap();
    assert_eq!(signatures.len(), 2);
    for signature in &signatures {
      let public = service.get_key(&signature.key_id).unwrap().unwrap();
      verify_signature(&public, signature, payload).unwrap();
    }

    // removal through the service deletes the on-disk copy
    service.remove_key(&disk_id).unwrap();
    assert_eq!(disk.get(&disk_id).unwrap(), None);
  }
}
