use crate::error::{KeyFileError, KeyFileResult};
use indexmap::IndexMap;
use pkcs8::{der::Decode, Document, EncryptedPrivateKeyInfo, LineEnding, PrivateKeyInfo};
use rand::rngs::OsRng;
use std::{
  fs,
  path::{Path, PathBuf},
  sync::{PoisonError, RwLock},
};
use tracing::{debug, warn};
use tufsig::prelude::{
  KeyId, KeyStore, PrivateKey, PublicKey, Role, SecretKey, SignatureScheme, SigningKey, TufSigError, TufSigResult,
  VerifyingKey,
};
use zeroize::Zeroizing;

const KEY_FILE_EXT: &str = "pem";
const ENCRYPTED_PEM_TAG: &str = "ENCRYPTED PRIVATE KEY";

struct IndexEntry {
  role: Role,
  scheme: SignatureScheme,
  path: PathBuf,
}

/// Persistent key store: one PBES2-encrypted PKCS#8 pem document per key at
/// `<root>/<role>/<key_id>.<scheme>.pem`.
///
/// The directory is scanned once at open into an id -> (role, scheme, path)
/// index; key material is decrypted only when a caller asks for a key, never
/// at scan time. The scheme rides in the file name because a stored
/// `rsaEncryption` document does not pin its padding mode.
///
/// Writes go through a temp file and rename, and the index lock serializes
/// them, so a create/remove race on one id cannot interleave on disk.
pub struct KeyFileStore {
  label: String,
  root: PathBuf,
  passphrase: Zeroizing<String>,
  index: RwLock<IndexMap<KeyId, IndexEntry>>,
}

impl KeyFileStore {
  /// Open (creating if needed) the store rooted at `root`. Every key file is
  /// encrypted under `passphrase`.
  pub fn open(root: impl Into<PathBuf>, passphrase: impl Into<String>) -> KeyFileResult<Self> {
    let root = root.into();
    fs::create_dir_all(&root)?;
    let index = scan(&root)?;
    debug!(root = %root.display(), keys = index.len(), "opened key file store");
    Ok(Self {
      label: format!("keyfile({})", root.display()),
      root,
      passphrase: Zeroizing::new(passphrase.into()),
      index: RwLock::new(index),
    })
  }

  fn role_dir(&self, role: &Role) -> KeyFileResult<PathBuf> {
    let name = role.as_str();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
      return Err(KeyFileError::InvalidRole(name.to_string()));
    }
    Ok(self.root.join(name))
  }

  fn insert_key(&self, role: &Role, secret: &SecretKey) -> KeyFileResult<PublicKey> {
    let public = secret.public_key();
    let key_id = public.key_id()?;
    let scheme = SigningKey::scheme(secret);
    let dir = self.role_dir(role)?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{key_id}.{scheme}.{KEY_FILE_EXT}"));

    let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
    self.write_key_file(&path, secret)?;
    debug!(key_id = %key_id, role = %role, path = %path.display(), "wrote key file");
    // a rewrite under a new role or scheme supersedes the old file
    if let Some(old) = index.get(&key_id) {
      if old.path != path {
        let _ = fs::remove_file(&old.path);
      }
    }
    index.insert(
      key_id,
      IndexEntry {
        role: role.clone(),
        scheme,
        path,
      },
    );
    Ok(public)
  }

  fn write_key_file(&self, path: &Path, secret: &SecretKey) -> KeyFileResult<()> {
    let der = secret.to_pkcs8_der()?;
    let pki = PrivateKeyInfo::from_der(&der).map_err(|e| KeyFileError::Encrypt(e.to_string()))?;
    let encrypted = pki
      .encrypt(OsRng, self.passphrase.as_bytes())
      .map_err(|e| KeyFileError::Encrypt(e.to_string()))?;
    let pem = encrypted
      .to_pem(ENCRYPTED_PEM_TAG, LineEnding::LF)
      .map_err(|e| KeyFileError::Encrypt(e.to_string()))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, pem.as_bytes())?;
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
  }

  fn decrypt_key_file(&self, path: &Path, scheme: SignatureScheme) -> KeyFileResult<SecretKey> {
    let pem = fs::read_to_string(path)?;
    let (tag, doc) = Document::from_pem(&pem).map_err(|e| KeyFileError::InvalidKeyFile {
      path: path.display().to_string(),
      reason: e.to_string(),
    })?;
    if tag != ENCRYPTED_PEM_TAG {
      return Err(KeyFileError::InvalidKeyFile {
        path: path.display().to_string(),
        reason: format!("unexpected pem tag {tag}"),
      });
    }
    let encrypted = EncryptedPrivateKeyInfo::from_der(doc.as_bytes()).map_err(|e| KeyFileError::InvalidKeyFile {
      path: path.display().to_string(),
      reason: e.to_string(),
    })?;
    let plain = encrypted
      .decrypt(self.passphrase.as_bytes())
      .map_err(|e| KeyFileError::Decrypt(e.to_string()))?;
    let secret = SecretKey::from_der(plain.as_bytes())?;
    apply_scheme(secret, scheme, path)
  }

  fn lookup(&self, key_id: &KeyId) -> Option<(Role, SignatureScheme, PathBuf)> {
    let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
    index
      .get(key_id)
      .map(|entry| (entry.role.clone(), entry.scheme, entry.path.clone()))
  }
}

/// Restore the scheme recorded in the file name. An `rsaEncryption` document
/// decodes as rsa-pss-sha256 and may actually be a v1_5 key; any other
/// disagreement between tag and material is a corrupt store.
fn apply_scheme(secret: SecretKey, scheme: SignatureScheme, path: &Path) -> KeyFileResult<SecretKey> {
  match (secret, scheme) {
    (SecretKey::RsaPssSha256(inner), SignatureScheme::RsaV15Sha256) => Ok(SecretKey::RsaV15Sha256(inner)),
    (secret, expected) if SigningKey::scheme(&secret) == expected => Ok(secret),
    (secret, expected) => Err(KeyFileError::InvalidKeyFile {
      path: path.display().to_string(),
      reason: format!(
        "scheme tag {expected} does not match key material {}",
        SigningKey::scheme(&secret)
      ),
    }),
  }
}

fn scan(root: &Path) -> KeyFileResult<IndexMap<KeyId, IndexEntry>> {
  let mut index = IndexMap::new();

  let mut role_dirs = Vec::new();
  for entry in fs::read_dir(root)? {
    let entry = entry?;
    if entry.file_type()?.is_dir() {
      role_dirs.push(entry.path());
    }
  }
  role_dirs.sort();

  for dir in role_dirs {
    let Some(role_name) = dir.file_name().and_then(|n| n.to_str()) else {
      continue;
    };
    let role = Role::new(role_name);

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir)? {
      let entry = entry?;
      if entry.file_type()?.is_file() {
        files.push(entry.path());
      }
    }
    files.sort();

    for path in files {
      let Some((key_id, scheme)) = parse_file_name(&path) else {
        warn!(path = %path.display(), "skipping non-key file in store directory");
        continue;
      };
      index.insert(
        key_id,
        IndexEntry {
          role: role.clone(),
          scheme,
          path,
        },
      );
    }
  }
  Ok(index)
}

/// Key files are named `<key_id>.<scheme>.pem`. Key ids are base64url and
/// scheme names are fixed identifiers, so neither contains a dot.
fn parse_file_name(path: &Path) -> Option<(KeyId, SignatureScheme)> {
  let name = path.file_name()?.to_str()?;
  let stem = name.strip_suffix(&format!(".{KEY_FILE_EXT}"))?;
  let (key_id, scheme) = stem.rsplit_once('.')?;
  let scheme = scheme.parse::<SignatureScheme>().ok()?;
  Some((KeyId::from(key_id), scheme))
}

impl KeyStore for KeyFileStore {
  fn name(&self) -> &str {
    &self.label
  }

  fn create(&self, role: &Role, scheme: SignatureScheme) -> TufSigResult<PublicKey> {
    let secret = SecretKey::generate(scheme)?;
    self.insert_key(role, &secret).map_err(Into::into)
  }

  fn get(&self, key_id: &KeyId) -> TufSigResult<Option<PublicKey>> {
    let Some((_, scheme, path)) = self.lookup(key_id) else {
      return Ok(None);
    };
    let secret = self.decrypt_key_file(&path, scheme).map_err(TufSigError::from)?;
    Ok(Some(secret.public_key()))
  }

  fn get_private(&self, key_id: &KeyId) -> TufSigResult<Option<(PrivateKey, Role)>> {
    let Some((role, scheme, path)) = self.lookup(key_id) else {
      return Ok(None);
    };
    let secret = self.decrypt_key_file(&path, scheme).map_err(TufSigError::from)?;
    Ok(Some((PrivateKey::from(secret), role)))
  }

  fn remove(&self, key_id: &KeyId) -> TufSigResult<()> {
    let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
    let Some(entry) = index.get(key_id) else {
      return Err(TufSigError::KeyNotFound(key_id.clone()));
    };
    fs::remove_file(&entry.path).map_err(|e| TufSigError::Store(format!("removing key file: {e}")))?;
    index.shift_remove(key_id);
    Ok(())
  }

  fn list(&self, role: &Role) -> TufSigResult<Vec<KeyId>> {
    let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
    Ok(
      index
        .iter()
        .filter(|(_, entry)| entry.role == *role)
        .map(|(key_id, _)| key_id.clone())
        .collect(),
    )
  }

  fn list_all(&self) -> TufSigResult<IndexMap<KeyId, Role>> {
    let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
    Ok(
      index
        .iter()
        .map(|(key_id, entry)| (key_id.clone(), entry.role.clone()))
        .collect(),
    )
  }

  fn import(&self, role: &Role, key: &SecretKey) -> TufSigResult<PublicKey> {
    self.insert_key(role, key).map_err(Into::into)
  }
}
