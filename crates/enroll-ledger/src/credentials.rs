use enroll_types::{strip_hex_prefix, Address};

use crate::error::LedgerError;

/// A sending account: its address plus the ed25519 key that signs for it.
///
/// The address is carried separately from the key because callers supply
/// both; the ledger decides whether they belong together.
#[derive(Clone)]
pub struct Credentials {
    address: Address,
    key: ed25519_dalek::SigningKey,
}

impl Credentials {
    /// Build credentials from an address and a hex-encoded 32-byte secret
    /// (optional `0x` prefix).
    pub fn new(address: Address, secret_hex: &str) -> Result<Self, LedgerError> {
        Ok(Self {
            address,
            key: parse_secret(secret_hex)?,
        })
    }

    /// Build credentials whose address is derived from the key itself.
    pub fn from_secret(secret_hex: &str) -> Result<Self, LedgerError> {
        let key = parse_secret(secret_hex)?;
        let address = Address::from_public_key(&key.verifying_key().to_bytes());
        Ok(Self { address, key })
    }

    /// Generate a fresh random account.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        let key = ed25519_dalek::SigningKey::generate(&mut csprng);
        let address = Address::from_public_key(&key.verifying_key().to_bytes());
        Self { address, key }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Hex encoding of the secret, for writing devnet configuration.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.key.to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        use ed25519_dalek::Signer;
        self.key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}

fn parse_secret(secret_hex: &str) -> Result<ed25519_dalek::SigningKey, LedgerError> {
    let bytes = hex::decode(strip_hex_prefix(secret_hex.trim()))
        .map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
    let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        LedgerError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len()))
    })?;
    Ok(ed25519_dalek::SigningKey::from_bytes(&secret))
}
