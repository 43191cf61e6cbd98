use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `previous_hash` value carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// `info` payload of the genesis block.
pub const GENESIS_INFO: &str = "Genesis Block";

/// One entry of the audit chain.
///
/// The hash is fixed at construction:
/// `hex(BLAKE3(decimal(index) ++ previous_hash ++ canonical_string(data)))`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) previous_hash: String,
    pub(crate) data: Value,
    pub(crate) hash: String,
}

impl Block {
    pub fn new(index: u64, previous_hash: impl Into<String>, data: Value) -> Self {
        let previous_hash = previous_hash.into();
        let hash = compute_hash(index, &previous_hash, &data);
        Self {
            index,
            previous_hash,
            data,
            hash,
        }
    }

    pub fn genesis() -> Self {
        Self::new(
            0,
            GENESIS_PREVIOUS_HASH,
            serde_json::json!({ "info": GENESIS_INFO }),
        )
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Recompute the hash from the stored fields.
    pub fn recompute_hash(&self) -> String {
        compute_hash(self.index, &self.previous_hash, &self.data)
    }

    /// `true` if the stored hash matches the stored fields.
    pub fn is_sealed(&self) -> bool {
        self.recompute_hash() == self.hash
    }
}

/// Compute a block hash from its parts.
pub fn compute_hash(index: u64, previous_hash: &str, data: &Value) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(index.to_string().as_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update(canonical_string(data).as_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

/// Compact JSON with object keys sorted at every level.
///
/// Sorting is done here rather than relying on the map type behind
/// `serde_json::Value`, whose ordering changes with the `preserve_order`
/// feature.
pub fn canonical_string(data: &Value) -> String {
    let mut out = String::new();
    write_canonical(data, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, inner)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(inner, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, inner) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(inner, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
