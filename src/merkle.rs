//! RFC 6962 binary Merkle tree over entry leaves.
//!
//! Leaves and internal nodes are tagged with `0x00`/`0x01` respectively, as
//! specified by RFC 6962 §2.1. Levels are retained so that an audit path can
//! be extracted for any leaf without rebuilding the tree; this is an
//! optimisation, not part of the observable contract (the only public
//! observable is the root hash).

use crate::hash::Hash;
use sha2::{Digest, Sha256};

type Digest32 = [u8; 32];

/// A full Merkle tree built from an ordered list of leaves.
pub struct Tree {
    /// `levels[0]` are the hashed leaves; the last level is `[root]`.
    /// An odd level promotes its last (orphan) node unchanged to the next.
    levels: Vec<Vec<Digest32>>,
    width: usize,
}

impl Tree {
    /// Build the tree from raw leaf bytes.
    pub fn new(leaves: &[Vec<u8>]) -> Self {
        let levels = build_levels(leaves);
        Self {
            levels,
            width: leaves.len(),
        }
    }

    /// The root hash, as `sha-256:<hex>`.
    pub fn root_hash(&self) -> Hash {
        let root = self.levels.last().expect("at least one level")[0];
        Hash::new("sha-256", hex::encode(root))
    }

    /// Number of leaves the tree was built from.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The audit path for the leaf at `node_index`: the sibling digest at
    /// each level on the way to the root, skipping orphan replicas that
    /// fall outside the current level's width.
    pub fn audit_path(&self, node_index: usize) -> Vec<Hash> {
        let mut path = Vec::new();

        if self.width == 0 {
            return path;
        }

        let mut index = node_index;
        let mut last_index = (self.width - 1) >> 0;
        let mut level = 0usize;

        if node_index > last_index {
            return path;
        }

        while last_index > 0 {
            if level >= self.levels.len() {
                break;
            }
            let sib = sibling(index);
            if sib <= last_index {
                path.push(Hash::new("sha-256", hex::encode(self.levels[level][sib])));
            }
            index = parent(index);
            last_index = parent(last_index);
            level += 1;
        }

        path
    }
}

/// Compute just the root hash for a list of leaves, the common case.
pub fn root_hash(leaves: &[Vec<u8>]) -> Hash {
    Tree::new(leaves).root_hash()
}

fn build_levels(leaves: &[Vec<u8>]) -> Vec<Vec<Digest32>> {
    if leaves.is_empty() {
        return vec![vec![hash_empty()]];
    }

    let mut level: Vec<Digest32> = leaves.iter().map(|l| hash_leaf(l)).collect();
    let mut levels = vec![level.clone()];

    if level.len() == 1 {
        return levels;
    }

    loop {
        level = build_level(&level);
        levels.push(level.clone());
        if level.len() == 1 {
            break;
        }
    }

    levels
}

fn build_level(level: &[Digest32]) -> Vec<Digest32> {
    if level.len() == 1 {
        return level.to_vec();
    }

    let mut next = Vec::with_capacity(level.len() / 2 + 1);
    let mut pairs = level.chunks_exact(2);

    for pair in &mut pairs {
        next.push(hash_node(&pair[0], &pair[1]));
    }

    let remainder = pairs.remainder();
    if let Some(orphan) = remainder.first() {
        next.push(*orphan);
    }

    next
}

fn hash_leaf(leaf: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update([0x00]);
    hasher.update(leaf);
    hasher.finalize().into()
}

fn hash_node(left: &Digest32, right: &Digest32) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update([0x01]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

fn hash_empty() -> Digest32 {
    Sha256::digest([]).into()
}

fn sibling(node_index: usize) -> usize {
    if is_right_child(node_index) {
        node_index - 1
    } else {
        node_index + 1
    }
}

fn is_right_child(node_index: usize) -> bool {
    node_index % 2 == 1
}

fn parent(node_index: usize) -> usize {
    node_index / 2
}
