//! RSASSA-PKCS1-v1_5 (RS256, RS384, RS512)

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use signet_jwk::{HashAlgorithm, KeyMaterial, base64url_decode};

/// Smallest modulus the key store will generate
pub const MIN_RSA_KEY_BITS: usize = 2048;

pub(crate) fn generate(bits: usize) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CryptoError::Signing(format!("RSA key generation failed: {e}")))
}

pub(crate) fn public_material(key: &RsaPrivateKey) -> KeyMaterial {
    let public = RsaPublicKey::from(key);
    KeyMaterial::rsa(&public.n().to_bytes_be(), &public.e().to_bytes_be())
}

pub(crate) fn public_key(n: &str, e: &str) -> CryptoResult<RsaPublicKey> {
    let modulus = base64url_decode(n).map_err(|e| CryptoError::invalid_key(e.to_string()))?;
    let exponent = base64url_decode(e).map_err(|e| CryptoError::invalid_key(e.to_string()))?;
    RsaPublicKey::new(
        BigUint::from_bytes_be(&modulus),
        BigUint::from_bytes_be(&exponent),
    )
    .map_err(|e| CryptoError::invalid_key(format!("Invalid RSA public key: {e}")))
}

pub(crate) fn sign(
    key: &RsaPrivateKey,
    hash: HashAlgorithm,
    message: &str,
) -> CryptoResult<Vec<u8>> {
    let message = message.as_bytes();
    let signature = match hash {
        HashAlgorithm::Sha256 => SigningKey::<Sha256>::new(key.clone()).try_sign(message),
        HashAlgorithm::Sha384 => SigningKey::<Sha384>::new(key.clone()).try_sign(message),
        HashAlgorithm::Sha512 => SigningKey::<Sha512>::new(key.clone()).try_sign(message),
    }
    .map_err(|e| CryptoError::Signing(format!("RSA signing failed: {e}")))?;
    Ok(signature.to_vec())
}

pub(crate) fn verify(
    key: &RsaPublicKey,
    hash: HashAlgorithm,
    message: &str,
    signature: &[u8],
) -> bool {
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };
    let message = message.as_bytes();
    match hash {
        HashAlgorithm::Sha256 => {
            VerifyingKey::<Sha256>::new(key.clone()).verify(message, &signature)
        }
        HashAlgorithm::Sha384 => {
            VerifyingKey::<Sha384>::new(key.clone()).verify(message, &signature)
        }
        HashAlgorithm::Sha512 => {
            VerifyingKey::<Sha512>::new(key.clone()).verify(message, &signature)
        }
    }
    .is_ok()
}
