use crate::{
  crypto::{PublicKey, VerifyingKey},
  error::{TufSigError, TufSigResult},
  types::Signature,
};

/// Check `signature` over `message` against `key`.
///
/// The signature's declared scheme must equal the key's scheme; a mismatch
/// fails with `SchemeMismatch` before any cryptographic work happens, so a
/// signature blob valid under one scheme can never be replayed against a key
/// of another. The scheme tags compared here are public values; no signature
/// or key bytes are compared outside the scheme's own mathematical check.
///
/// A mismatch and a bad signature are distinct failures on purpose: both are
/// rejections, but callers audit them differently.
pub fn verify_signature(key: &PublicKey, signature: &Signature, message: &[u8]) -> TufSigResult<()> {
  if signature.scheme != key.scheme() {
    return Err(TufSigError::SchemeMismatch {
      key: key.scheme(),
      signature: signature.scheme,
    });
  }
  key.verify(message, &signature.signature)
}
