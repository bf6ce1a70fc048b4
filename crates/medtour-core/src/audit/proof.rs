//! Inclusion proofs and their portable form.

use serde::{Deserialize, Serialize};

/// Merkle inclusion proof for one ledger leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub leaf_hash: String,
    /// Root the proof was generated against
    pub root_hash: String,
    /// Sibling hashes from leaf to root
    pub siblings: Vec<String>,
    /// true = sibling sits to the right of the running hash
    pub sibling_on_right: Vec<bool>,
    pub leaf_index: usize,
}

impl InclusionProof {
    /// Self-describing form for audit exports.
    pub fn to_portable(&self) -> PortableProof {
        PortableProof {
            version: "1.0".to_string(),
            algorithm: "SHA-256".to_string(),
            leaf_hash: self.leaf_hash.clone(),
            root_hash: self.root_hash.clone(),
            path: self
                .siblings
                .iter()
                .zip(&self.sibling_on_right)
                .map(|(hash, on_right)| ProofStep {
                    hash: hash.clone(),
                    position: if *on_right { "right" } else { "left" }.to_string(),
                })
                .collect(),
            leaf_index: self.leaf_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortableProof {
    pub version: String,
    pub algorithm: String,
    pub leaf_hash: String,
    pub root_hash: String,
    pub path: Vec<ProofStep>,
    pub leaf_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofStep {
    pub hash: String,
    /// "left" or "right"
    pub position: String,
}

impl PortableProof {
    /// Back to the verifiable form. `None` if a step has an unknown position.
    pub fn to_inclusion_proof(&self) -> Option<InclusionProof> {
        let sibling_on_right = self
            .path
            .iter()
            .map(|step| match step.position.as_str() {
                "right" => Some(true),
                "left" => Some(false),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Some(InclusionProof {
            leaf_hash: self.leaf_hash.clone(),
            root_hash: self.root_hash.clone(),
            siblings: self.path.iter().map(|s| s.hash.clone()).collect(),
            sibling_on_right,
            leaf_index: self.leaf_index,
        })
    }
}
