mod crypto;
mod cryptoservice;
mod error;
mod keystore;
mod trace;
mod types;
mod verify;

pub mod prelude {
  pub use crate::{
    crypto::{PrivateKey, PublicKey, SecretKey, SignatureScheme, SigningKey, VerifyingKey},
    cryptoservice::CryptoService,
    error::{TufSigError, TufSigResult},
    keystore::{KeyStore, MemoryStore, ReadOnly},
    types::{KeyId, Role, Signature},
    verify::verify_signature,
  };
}

/* ----------------------------------------------------------------- */
#[cfg(test)]
mod tests {
  use super::prelude::*;
  use std::sync::Arc;

  /// End-to-end flow: a primary volatile store plus a read-only fallback
  /// seeded with an imported root key, a quorum signature set over one
  /// payload, and independent verification of every signature.
  #[test]
  fn test_quorum_signing_end_to_end() {
    let seeded = MemoryStore::new("seeded");
    let root_secret = SecretKey::generate(SignatureScheme::Ed25519).unwrap();
    let root_key = seeded.import(&Role::root(), &root_secret).unwrap();
    let root_id = root_key.key_id().unwrap();

    let primary = Arc::new(MemoryStore::new("primary"));
    let service = CryptoService::new(vec![primary, Arc::new(ReadOnly::new(seeded))]);

    let targets_a = service
      .create(&Role::targets(), SignatureScheme::EcdsaP256Sha256)
      .unwrap()
      .key_id()
      .unwrap();
    let targets_b = service
      .create(&Role::targets(), SignatureScheme::EcdsaP384Sha384)
      .unwrap()
      .key_id()
      .unwrap();

    assert_eq!(service.list_keys(&Role::root()).unwrap(), vec![root_id.clone()]);
    assert_eq!(service.list_all_keys().unwrap().len(), 3);

    let payload = br#"{"signed":{"_type":"targets","version":4}}"#;
    let quorum = vec![root_id, targets_a, targets_b];
    let signatures = service.sign(&quorum, payload).unwrap();
    assert_eq!(signatures.len(), quorum.len());

    for (signature, key_id) in signatures.iter().zip(&quorum) {
      assert_eq!(&signature.key_id, key_id);
      let public = service.get_key(key_id).unwrap().unwrap();
      verify_signature(&public, signature, payload).unwrap();
      assert!(verify_signature(&public, signature, b"forged payload").is_err());
    }
  }

  /// A quorum that names a key the service cannot resolve yields no
  /// signatures at all, and the set produced before the failure is dropped.
  #[test]
  fn test_unsatisfiable_quorum_yields_nothing() {
    let service = CryptoService::new(vec![Arc::new(MemoryStore::new("only"))]);
    let known = service
      .create(&Role::root(), SignatureScheme::Ed25519)
      .unwrap()
      .key_id()
      .unwrap();
    let unknown = KeyId::from("gone");

    let err = service.sign(&[known.clone(), unknown.clone()], b"payload").unwrap_err();
    assert!(matches!(err, TufSigError::KeyNotFound(id) if id == unknown));

    // the known key alone still signs
    assert_eq!(service.sign(&[known], b"payload").unwrap().len(), 1);
  }

  /// Imported root keys round-trip through the pem boundary and sign like
  /// locally created ones.
  #[test]
  fn test_imported_root_key_signs() {
    let service = CryptoService::new(vec![Arc::new(MemoryStore::new("mem"))]);
    let secret = SecretKey::generate(SignatureScheme::EcdsaP256Sha256).unwrap();
    let pem = secret.to_pem().unwrap();

    let imported = service.import_root_key(pem.as_bytes()).unwrap();
    let id = imported.key_id().unwrap();
    assert_eq!(SigningKey::key_id(&secret).unwrap(), id);

    let signatures = service.sign(std::slice::from_ref(&id), b"root metadata").unwrap();
    verify_signature(&imported, &signatures[0], b"root metadata").unwrap();
  }
}
