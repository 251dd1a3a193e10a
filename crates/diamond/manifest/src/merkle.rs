//! Merkle engine
//!
//! Leaves are `keccak256(abi.encode(bytes4 selector, address facet))`, one per
//! route in route order. Adjacent leaves are paired sequentially (a trailing
//! unpaired node pairs with itself) and each pair is hashed as
//! `keccak256(min ++ max)`. Sorting inside the pair makes verification
//! orientation-free; pairing in array order makes the root depend on route
//! order, so a manifest must be rebuilt in the same order to compare roots.
//!
//! An empty tree has the zero hash as root; a single leaf is its own root.

use diamond_types::{keccak256, Address, Route, Selector, B256, ZERO_HASH};

use crate::error::{ManifestError, Result};

/// Leaf of one `selector -> facet` route.
pub fn leaf(selector: Selector, facet: Address) -> B256 {
    let mut encoded = [0u8; 64];
    encoded[..32].copy_from_slice(&selector.to_abi_word());
    encoded[44..].copy_from_slice(facet.as_slice());
    keccak256(encoded)
}

pub fn route_leaf(route: &Route) -> B256 {
    leaf(route.selector, route.facet)
}

/// Leaves of a route list, in route order.
pub fn leaves(routes: &[Route]) -> Vec<B256> {
    routes.iter().map(route_leaf).collect()
}

/// `keccak256(min(a, b) ++ max(a, b))`
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

fn next_level(level: &[B256]) -> Vec<B256> {
    level
        .chunks(2)
        .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
        .collect()
}

/// A tree with every level retained, so proofs walk exactly the pairing
/// used to compute the root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<B256>>,
}

impl MerkleTree {
    pub fn new(leaves: &[B256]) -> Self {
        let mut levels = vec![leaves.to_vec()];
        while levels[levels.len() - 1].len() > 1 {
            let next = next_level(&levels[levels.len() - 1]);
            levels.push(next);
        }
        Self { levels }
    }

    pub fn leaves(&self) -> &[B256] {
        &self.levels[0]
    }

    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    pub fn root(&self) -> B256 {
        match self.levels.last().and_then(|top| top.first()) {
            Some(root) => *root,
            None => ZERO_HASH,
        }
    }

    /// Sibling path for the leaf at `index`, bottom level first.
    pub fn proof(&self, index: usize) -> Result<Vec<B256>> {
        if index >= self.len() {
            return Err(ManifestError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }

        let mut proof = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut i = index;
        for level in &self.levels[..self.levels.len() - 1] {
            proof.push(level.get(i ^ 1).copied().unwrap_or(level[i]));
            i /= 2;
        }
        Ok(proof)
    }
}

/// Root over `leaves`.
pub fn build_root(leaves: &[B256]) -> B256 {
    if leaves.is_empty() {
        return ZERO_HASH;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Sibling path for `leaves[index]`.
pub fn build_proof(leaves: &[B256], index: usize) -> Result<Vec<B256>> {
    MerkleTree::new(leaves).proof(index)
}

/// Recompute the root from `leaf` and `proof` and compare it to `root`.
pub fn verify(leaf: &B256, proof: &[B256], root: &B256) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}
