//! Per-case audit trail with ledger inclusion proofs.

use serde::{Deserialize, Serialize};

use crate::audit::{hash_data, verify_proof, AuditError, AuditLedger, AuditResult, PortableProof};
use crate::db::Database;
use crate::models::{ActivityLogEntry, StatusHistoryEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTrailMetadata {
    pub format_version: String,
    pub exported_at: String,
    pub hash_algorithm: String,
    /// Ledger root the proofs were generated against
    pub root_hash: Option<String>,
    pub leaf_count: u32,
    pub system_id: Option<String>,
}

/// One activity entry and the proof that the ledger holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditedEntry {
    pub entry: ActivityLogEntry,
    pub leaf_hash: String,
    /// `None` when the entry was never committed to the ledger
    pub proof: Option<PortableProof>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseAuditTrail {
    pub metadata: AuditTrailMetadata,
    pub case_id: String,
    pub patient_name: String,
    pub current_status: String,
    pub status_history: Vec<StatusHistoryEntry>,
    pub activity: Vec<AuditedEntry>,
}

/// Outcome of checking one exported entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryVerification {
    pub entry_id: String,
    pub leaf_hash: String,
    pub is_valid: bool,
}

impl CaseAuditTrail {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Re-hash every entry and check it against its proof.
    pub fn verify_all(&self) -> Vec<EntryVerification> {
        self.activity
            .iter()
            .map(|audited| {
                let hash_matches = audited
                    .entry
                    .to_canonical_json()
                    .map(|json| hash_data(json.as_bytes()) == audited.leaf_hash)
                    .unwrap_or(false);
                let proof_holds = audited
                    .proof
                    .as_ref()
                    .and_then(PortableProof::to_inclusion_proof)
                    .is_some_and(|proof| proof.leaf_hash == audited.leaf_hash && verify_proof(&proof));

                EntryVerification {
                    entry_id: audited.entry.id.clone(),
                    leaf_hash: audited.leaf_hash.clone(),
                    is_valid: hash_matches && proof_holds,
                }
            })
            .collect()
    }
}

pub struct AuditTrailExporter<'a> {
    db: &'a Database,
    ledger: AuditLedger<'a>,
    system_id: Option<String>,
}

impl<'a> AuditTrailExporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            ledger: AuditLedger::new(db),
            system_id: None,
        }
    }

    pub fn with_system_id(mut self, system_id: String) -> Self {
        self.system_id = Some(system_id);
        self
    }

    /// Status history and activity of one case, each entry with its proof.
    pub fn export_case(&self, case_id: &str) -> AuditResult<Option<CaseAuditTrail>> {
        let Some(case) = self.db.get_case(case_id)? else {
            tracing::warn!(case_id, "audit export for unknown case");
            return Ok(None);
        };
        let root = self.db.get_audit_root()?;

        let mut activity = Vec::with_capacity(case.activity_log.len());
        for entry in case.activity_log {
            let leaf_hash = hash_data(entry.to_canonical_json()?.as_bytes());
            let proof = match self.ledger.generate_proof(&leaf_hash) {
                Ok(proof) => Some(proof.to_portable()),
                Err(AuditError::NodeNotFound(_)) | Err(AuditError::InvalidState(_)) => None,
                Err(e) => return Err(e),
            };
            activity.push(AuditedEntry {
                entry,
                leaf_hash,
                proof,
            });
        }

        Ok(Some(CaseAuditTrail {
            metadata: AuditTrailMetadata {
                format_version: "1.0".to_string(),
                exported_at: chrono::Utc::now().to_rfc3339(),
                hash_algorithm: "SHA-256".to_string(),
                root_hash: root.root_hash,
                leaf_count: root.leaf_count,
                system_id: self.system_id.clone(),
            },
            current_status: case.status.as_str().to_string(),
            patient_name: case.client_info.full_name,
            case_id: case.id,
            status_history: case.status_history,
            activity,
        }))
    }
}
