//! HMAC-SHA (HS256, HS384, HS512)

use crate::error::{CryptoError, CryptoResult};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use signet_jwk::HashAlgorithm;
use subtle::ConstantTimeEq;

fn mac<M: Mac + hmac::digest::KeyInit>(secret: &[u8], message: &str) -> CryptoResult<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|_| CryptoError::invalid_key("Invalid HMAC key"))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn sign(hash: HashAlgorithm, secret: &[u8], message: &str) -> CryptoResult<Vec<u8>> {
    match hash {
        HashAlgorithm::Sha256 => mac::<Hmac<Sha256>>(secret, message),
        HashAlgorithm::Sha384 => mac::<Hmac<Sha384>>(secret, message),
        HashAlgorithm::Sha512 => mac::<Hmac<Sha512>>(secret, message),
    }
}

/// Constant-time comparison against a freshly computed tag
pub(crate) fn verify(
    hash: HashAlgorithm,
    secret: &[u8],
    message: &str,
    signature: &[u8],
) -> CryptoResult<bool> {
    let expected = sign(hash, secret, message)?;
    Ok(expected.ct_eq(signature).into())
}
