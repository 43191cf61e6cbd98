use serde::Serialize;
use serde_json::Value;

use crate::block::Block;
use crate::error::ChainError;

/// Append-only, hash-linked log of accepted events.
///
/// Starts with the fixed genesis block. Blocks are only ever pushed at the
/// tail; nothing in the public API rewrites or removes an existing block.
/// This is local tamper evidence, not consensus: whoever holds the chain can
/// rebuild it wholesale.
#[derive(Clone, Debug)]
pub struct HashChain {
    blocks: Vec<Block>,
}

impl HashChain {
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Rebuild a chain from exported blocks.
    ///
    /// The blocks are taken as-is; run [`Self::verify`] before trusting them.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::Empty);
        }
        Ok(Self { blocks })
    }

    /// Seal `data` into a new tail block and return it.
    pub fn append(&mut self, data: Value) -> Block {
        let tail = self.tail();
        let block = Block::new(self.blocks.len() as u64, tail.hash(), data);
        self.blocks.push(block.clone());
        block
    }

    /// Serialize a typed record and append it.
    pub fn append_record<T: Serialize>(&mut self, record: &T) -> Result<Block, ChainError> {
        let data =
            serde_json::to_value(record).map_err(|e| ChainError::Serialization(e.to_string()))?;
        Ok(self.append(data))
    }

    /// `true` if every block is correctly sealed and linked.
    pub fn verify(&self) -> bool {
        self.verify_detailed().is_ok()
    }

    /// Verify the whole chain, reporting the first violation.
    ///
    /// Checks, in order for each position `i`:
    /// 1. Position 0 is exactly the genesis block
    /// 2. The block's index equals `i`
    /// 3. Its `previous_hash` equals block `i - 1`'s hash
    /// 4. Its stored hash matches the recomputed hash
    pub fn verify_detailed(&self) -> Result<(), ChainError> {
        let genesis = self.blocks.first().ok_or(ChainError::Empty)?;
        if *genesis != Block::genesis() {
            return Err(ChainError::InvalidGenesis);
        }

        for (position, block) in self.blocks.iter().enumerate().skip(1) {
            if block.index() != position as u64 {
                return Err(ChainError::IndexMismatch {
                    position,
                    found: block.index(),
                });
            }

            if block.previous_hash() != self.blocks[position - 1].hash() {
                return Err(ChainError::BrokenLink { index: position });
            }

            if !block.is_sealed() {
                return Err(ChainError::HashMismatch { index: position });
            }
        }

        Ok(())
    }

    pub fn tail(&self) -> &Block {
        // Never empty: `new` seeds genesis, `from_blocks` rejects empty input.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

impl Default for HashChain {
    fn default() -> Self {
        Self::new()
    }
}
