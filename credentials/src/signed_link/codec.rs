//! Timestamped HMAC-SHA256 token primitive.
//!
//! Layout: `<message>.<timestamp>.<signature>`, where `timestamp` is the
//! unpadded base64url of the big-endian unix seconds and `signature` is the
//! unpadded base64url MAC over `<message>.<timestamp>`. The timestamp can be
//! read without the secret but not altered without breaking the signature.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

pub fn sign(secret: &[u8], message: &str, timestamp: u64) -> String {
    let mut token = format!(
        "{message}{SEPARATOR}{}",
        URL_SAFE_NO_PAD.encode(timestamp.to_be_bytes())
    );

    let signature = mac(secret, token.as_bytes()).finalize().into_bytes();
    token.push(SEPARATOR);
    token.push_str(&URL_SAFE_NO_PAD.encode(signature));
    token
}

/// Returns the signed message if the signature matches.
pub fn verify<'a>(secret: &[u8], token: &'a str) -> Option<&'a str> {
    let (signed, signature) = token.rsplit_once(SEPARATOR)?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    mac(secret, signed.as_bytes())
        .verify_slice(&signature)
        .ok()?;

    let (message, _) = signed.rsplit_once(SEPARATOR)?;
    Some(message)
}

/// Reads the embedded issuance time. Does not check the signature.
pub fn extract_timestamp(token: &str) -> Option<u64> {
    let (signed, _) = token.rsplit_once(SEPARATOR)?;
    let (_, timestamp) = signed.rsplit_once(SEPARATOR)?;

    let bytes: [u8; 8] = URL_SAFE_NO_PAD
        .decode(timestamp)
        .ok()?
        .try_into()
        .ok()?;
    Some(u64::from_be_bytes(bytes))
}

fn mac(secret: &[u8], data: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac
}
