use std::fmt;

use serde::{Deserialize, Serialize};

use enroll_types::{Address, TxHash};

use crate::credentials::Credentials;
use crate::error::LedgerError;

/// A state-changing call on the enrollment contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ContractAction {
    /// Enroll the sender in a course.
    Enroll { course_code: String },
    /// Register a new course. Admin only.
    AddCourse {
        name: String,
        seats: u32,
        prerequisites: Vec<String>,
    },
}

impl ContractAction {
    pub fn enroll(course_code: impl Into<String>) -> Self {
        Self::Enroll {
            course_code: course_code.into(),
        }
    }

    pub fn add_course(name: impl Into<String>, seats: u32, prerequisites: Vec<String>) -> Self {
        Self::AddCourse {
            name: name.into(),
            seats,
            prerequisites,
        }
    }

    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Enroll { .. } => "enroll",
            Self::AddCourse { .. } => "addCourse",
        }
    }
}

impl fmt::Display for ContractAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enroll { course_code } => write!(f, "enroll({course_code})"),
            Self::AddCourse { name, seats, .. } => write!(f, "addCourse({name}, {seats})"),
        }
    }
}

/// An unsigned, fee-bearing transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub action: ContractAction,
}

impl TransactionRequest {
    /// Bytes covered by the signature: compact JSON in field order.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

/// A request plus the sender's public key and ed25519 signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub request: TransactionRequest,
    /// Hex-encoded 32-byte public key.
    pub public_key: String,
    /// Hex-encoded 64-byte signature.
    pub signature: String,
}

impl SignedTransaction {
    pub fn sign(
        request: TransactionRequest,
        credentials: &Credentials,
    ) -> Result<Self, LedgerError> {
        let message = request.signing_bytes()?;
        let signature = credentials.sign(&message);
        Ok(Self {
            request,
            public_key: hex::encode(credentials.public_key()),
            signature: hex::encode(signature),
        })
    }

    /// Check the signature, and that the signing key owns `request.from`.
    pub fn verify(&self) -> Result<(), LedgerError> {
        use ed25519_dalek::Verifier;

        let public_key: [u8; 32] = decode_fixed(&self.public_key)?;
        let signature: [u8; 64] = decode_fixed(&self.signature)?;

        if Address::from_public_key(&public_key) != self.request.from {
            return Err(LedgerError::InvalidSignature);
        }

        let key = ed25519_dalek::VerifyingKey::from_bytes(&public_key)
            .map_err(|_| LedgerError::InvalidSignature)?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature);
        key.verify(&self.request.signing_bytes()?, &signature)
            .map_err(|_| LedgerError::InvalidSignature)
    }

    /// Wire encoding submitted to the ledger.
    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn decode(raw: &[u8]) -> Result<Self, LedgerError> {
        serde_json::from_slice(raw).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// `0x`-prefixed BLAKE3 of the wire encoding.
    pub fn hash(&self) -> Result<TxHash, LedgerError> {
        Ok(TxHash::from_digest(*blake3::hash(&self.encode()?).as_bytes()))
    }
}

fn decode_fixed<const N: usize>(value: &str) -> Result<[u8; N], LedgerError> {
    let bytes = hex::decode(value).map_err(|_| LedgerError::InvalidSignature)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| LedgerError::InvalidSignature)
}
