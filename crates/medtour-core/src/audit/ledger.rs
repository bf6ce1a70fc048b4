//! Merkle tree over committed activity entries.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::Database;
use crate::models::ActivityLogEntry;

use super::proof::InclusionProof;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid ledger state: {0}")]
    InvalidState(String),
}

pub type AuditResult<T> = Result<T, AuditError>;

/// Outcome of committing one activity entry.
#[derive(Debug, Clone)]
pub struct LeafCommit {
    pub leaf_hash: String,
    /// Root after the commit
    pub root_hash: String,
    pub tree_height: u32,
    pub leaf_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStats {
    pub root_hash: Option<String>,
    pub height: u32,
    pub leaf_count: u32,
}

/// Append-only audit ledger backed by the `audit_nodes` table.
pub struct AuditLedger<'a> {
    db: &'a Database,
}

impl<'a> AuditLedger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Commit an activity entry. Committing the same entry twice is a no-op.
    pub fn commit_entry(&self, entry: &ActivityLogEntry) -> AuditResult<LeafCommit> {
        let payload = entry.to_canonical_json()?;
        let leaf_hash = hash_data(payload.as_bytes());

        if self.db.audit_node_exists(&leaf_hash)? {
            let root = self.db.get_audit_root()?;
            return Ok(LeafCommit {
                leaf_hash,
                root_hash: root.root_hash.unwrap_or_default(),
                tree_height: root.tree_height,
                leaf_count: root.leaf_count,
            });
        }

        self.db
            .insert_audit_leaf(&leaf_hash, &payload, &entry.case_id)?;

        // Full rebuild per commit; cost is linear in ledger size
        let leaves = self.db.get_all_audit_leaf_hashes()?;
        let (root_hash, height) = self.build_tree(&leaves)?;
        let leaf_count = leaves.len() as u32;
        self.db.update_audit_root(&root_hash, height, leaf_count)?;

        tracing::debug!(case_id = %entry.case_id, action = %entry.action, leaf = %leaf_hash, "committed audit leaf");

        Ok(LeafCommit {
            leaf_hash,
            root_hash,
            tree_height: height,
            leaf_count,
        })
    }

    /// Build the tree over `leaves`, storing any missing internal nodes.
    /// Returns (root_hash, height).
    fn build_tree(&self, leaves: &[String]) -> AuditResult<(String, u32)> {
        let Some(first) = leaves.first() else {
            return Err(AuditError::InvalidState("Cannot build tree with no leaves".into()));
        };
        if leaves.len() == 1 {
            return Ok((first.clone(), 1));
        }

        let mut level: Vec<String> = leaves.to_vec();
        let mut height = 1u32;

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                let left = &pair[0];
                let right = pair.get(1);
                let parent = parent_hash(left, right.unwrap_or(left));

                if !self.db.audit_node_exists(&parent)? {
                    self.db
                        .insert_audit_internal(&parent, left, right.map(String::as_str))?;
                }
                next.push(parent);
            }
            level = next;
            height += 1;
        }

        Ok((level.swap_remove(0), height))
    }

    /// Inclusion proof for a committed leaf against the current root.
    pub fn generate_proof(&self, leaf_hash: &str) -> AuditResult<InclusionProof> {
        let root_hash = self
            .db
            .get_audit_root()?
            .root_hash
            .ok_or_else(|| AuditError::InvalidState("Ledger has no root".into()))?;

        let mut level = self.db.get_all_audit_leaf_hashes()?;
        let leaf_index = level
            .iter()
            .position(|h| h == leaf_hash)
            .ok_or_else(|| AuditError::NodeNotFound(leaf_hash.to_string()))?;

        let mut siblings = Vec::new();
        let mut sibling_on_right = Vec::new();
        let mut index = leaf_index;

        while level.len() > 1 {
            let is_left = index % 2 == 0;
            let sibling = if is_left { index + 1 } else { index - 1 };
            // Odd node at the end of a level pairs with itself
            siblings.push(level.get(sibling).unwrap_or(&level[index]).clone());
            sibling_on_right.push(is_left);

            level = level
                .chunks(2)
                .map(|pair| parent_hash(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();
            index /= 2;
        }

        Ok(InclusionProof {
            leaf_hash: leaf_hash.to_string(),
            root_hash,
            siblings,
            sibling_on_right,
            leaf_index,
        })
    }

    pub fn verify_proof(&self, proof: &InclusionProof) -> bool {
        verify_proof(proof)
    }

    pub fn root_hash(&self) -> AuditResult<Option<String>> {
        Ok(self.db.get_audit_root()?.root_hash)
    }

    pub fn stats(&self) -> AuditResult<LedgerStats> {
        let root = self.db.get_audit_root()?;
        Ok(LedgerStats {
            root_hash: root.root_hash,
            height: root.tree_height,
            leaf_count: root.leaf_count,
        })
    }

    /// Entries committed for a case, decoded, with their leaf hashes.
    pub fn entries_for_case(&self, case_id: &str) -> AuditResult<Vec<(String, ActivityLogEntry)>> {
        let mut entries = Vec::new();
        for node in self.db.get_audit_leaves_for_case(case_id)? {
            let payload = node
                .payload
                .ok_or_else(|| AuditError::InvalidState(format!("Leaf {} has no payload", node.hash)))?;
            entries.push((node.hash, serde_json::from_str(&payload)?));
        }
        Ok(entries)
    }
}

/// SHA-256 of `data` as lowercase hex.
pub fn hash_data(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn parent_hash(left: &str, right: &str) -> String {
    hash_data(format!("{}{}", left, right).as_bytes())
}

/// Recompute the root from a proof and compare.
pub fn verify_proof(proof: &InclusionProof) -> bool {
    if proof.siblings.len() != proof.sibling_on_right.len() {
        return false;
    }

    let computed = proof
        .siblings
        .iter()
        .zip(&proof.sibling_on_right)
        .fold(proof.leaf_hash.clone(), |current, (sibling, on_right)| {
            if *on_right {
                parent_hash(&current, sibling)
            } else {
                parent_hash(sibling, &current)
            }
        });

    computed == proof.root_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, Role};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_entry(case_id: &str, details: &str) -> ActivityLogEntry {
        let actor = Actor::new("agent_1", "Alice Agent", Role::Agent);
        ActivityLogEntry::new(case_id, &actor, "Status Updated", details.to_string())
    }

    #[test]
    fn test_commit_single_entry() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);

        let commit = ledger.commit_entry(&make_entry("case_1", "New → Agent Review")).unwrap();

        assert_eq!(commit.leaf_count, 1);
        assert_eq!(commit.tree_height, 1);
        // Single leaf: root is the leaf
        assert_eq!(commit.leaf_hash, commit.root_hash);
    }

    #[test]
    fn test_root_changes_per_commit() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);

        let c1 = ledger.commit_entry(&make_entry("case_1", "one")).unwrap();
        let c2 = ledger.commit_entry(&make_entry("case_1", "two")).unwrap();
        let c3 = ledger.commit_entry(&make_entry("case_2", "three")).unwrap();

        assert_eq!(c3.leaf_count, 3);
        assert_ne!(c1.root_hash, c2.root_hash);
        assert_ne!(c2.root_hash, c3.root_hash);
        assert_eq!(c2.tree_height, 2);
        assert_eq!(c3.tree_height, 3);
    }

    #[test]
    fn test_idempotent_commit() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);
        let entry = make_entry("case_1", "one");

        let first = ledger.commit_entry(&entry).unwrap();
        let second = ledger.commit_entry(&entry).unwrap();

        assert_eq!(first.root_hash, second.root_hash);
        assert_eq!(second.leaf_count, 1);
    }

    #[test]
    fn test_proofs_verify_for_every_leaf() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);
        for i in 0..5 {
            ledger.commit_entry(&make_entry("case_1", &format!("step {}", i))).unwrap();
        }

        for leaf in db.get_all_audit_leaf_hashes().unwrap() {
            let proof = ledger.generate_proof(&leaf).unwrap();
            assert!(ledger.verify_proof(&proof), "proof failed for {}", leaf);
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);
        ledger.commit_entry(&make_entry("case_1", "one")).unwrap();
        ledger.commit_entry(&make_entry("case_1", "two")).unwrap();

        let leaves = db.get_all_audit_leaf_hashes().unwrap();
        let mut proof = ledger.generate_proof(&leaves[0]).unwrap();
        proof.leaf_hash = hash_data(b"forged");
        assert!(!verify_proof(&proof));
    }

    #[test]
    fn test_unknown_leaf_has_no_proof() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);
        ledger.commit_entry(&make_entry("case_1", "one")).unwrap();

        let result = ledger.generate_proof("missing");
        assert!(matches!(result, Err(AuditError::NodeNotFound(_))));
    }

    #[test]
    fn test_entries_for_case_decode() {
        let db = setup_db();
        let ledger = AuditLedger::new(&db);
        let entry = make_entry("case_1", "one");
        ledger.commit_entry(&entry).unwrap();
        ledger.commit_entry(&make_entry("case_2", "other")).unwrap();

        let entries = ledger.entries_for_case("case_1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, entry);
        assert_eq!(ledger.stats().unwrap().leaf_count, 2);
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        assert_eq!(hash_data(b"abc").len(), 64);
        assert_eq!(hash_data(b"abc"), hash_data(b"abc"));
    }
}
