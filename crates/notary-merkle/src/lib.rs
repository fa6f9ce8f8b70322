//!
//! Merkle tree over 64-byte nonces using the Roughtime leaf and node tweak values.
//!
//! Every node is a full SHA-512 output. At each level of a proof the low bit of the leaf
//! index says whether the running hash is the left (0) or right (1) child.
//!

// The merkle crate uses only safe Rust.
#![forbid(unsafe_code)]

use aws_lc_rs::digest;
use notary_protocol::error::Error;
pub use notary_protocol::tags::MerklePath;

/// Prepended to a nonce before hashing it into a leaf.
const LEAF_TWEAK: &[u8] = &[0x00];

/// Prepended to the left and right children before hashing them into their parent.
const NODE_TWEAK: &[u8] = &[0x01];

const OUTPUT_LEN: usize = 64;

pub type Hash = [u8; OUTPUT_LEN];

/// A binary tree where each leaf is one request's nonce and each inner node hashes its two
/// children. Leaves are indexed left to right from zero.
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl Default for MerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MerkleTree {
    pub fn new() -> MerkleTree {
        MerkleTree {
            levels: vec![vec![]],
        }
    }

    pub fn push_leaf(&mut self, data: &[u8]) {
        let hash = hash_leaf(data);
        self.levels[0].push(hash);
    }

    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    pub fn clear(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }

    /// Sibling hashes from leaf `index` up to the root. Call after `compute_root`.
    pub fn get_paths(&self, mut index: usize) -> Result<MerklePath, Error> {
        let mut path = MerklePath::default();

        for level in &self.levels {
            let sibling = index ^ 1;

            // no sibling at this level means we've reached the root
            if sibling >= level.len() {
                break;
            }

            path.push_element(&level[sibling])?;
            index /= 2;
        }

        Ok(path)
    }

    /// Hash all levels of the tree and return the root. Returns `None` for an empty tree.
    pub fn compute_root(&mut self) -> Option<Hash> {
        if self.is_empty() {
            return None;
        }

        let mut level = 0;
        let mut node_count = self.levels[0].len();

        while node_count > 1 {
            level += 1;

            if self.levels.len() < level + 1 {
                self.levels.push(Vec::new());
            }
            self.levels[level].clear();

            if !node_count.is_multiple_of(2) {
                // odd levels are padded with an all-zero node
                self.levels[level - 1].push([0; OUTPUT_LEN]);
                node_count += 1;
            }

            node_count /= 2;
            self.levels[level].reserve(node_count);

            for i in 0..node_count {
                let hash = hash_nodes(
                    &self.levels[level - 1][i * 2],
                    &self.levels[level - 1][(i * 2) + 1],
                );
                self.levels[level].push(hash);
            }
        }

        Some(self.levels[level][0])
    }
}

/// Recompute a root from a leaf's `data`, its `index` and the proof `paths`.
///
/// Only the low `paths.depth()` bits of `index` are consumed. Callers that need to bind
/// the whole index must check the remaining bits themselves.
pub fn root_from_paths(mut index: u32, data: &[u8], paths: &MerklePath) -> Hash {
    let mut hash = hash_leaf(data);

    for path in paths.elements() {
        hash = if index & 1 == 0 {
            hash_nodes(&hash, path)
        } else {
            hash_nodes(path, &hash)
        };
        index >>= 1;
    }

    hash
}

fn hash_leaf(leaf: &[u8]) -> Hash {
    hash(&[LEAF_TWEAK, leaf])
}

fn hash_nodes(first: &[u8], second: &[u8]) -> Hash {
    hash(&[NODE_TWEAK, first, second])
}

fn hash(to_hash: &[&[u8]]) -> Hash {
    let mut ctx = digest::Context::new(&digest::SHA512);
    for &data in to_hash {
        ctx.update(data);
    }
    let mut result = [0u8; OUTPUT_LEN];
    result.copy_from_slice(ctx.finish().as_ref());
    result
}
