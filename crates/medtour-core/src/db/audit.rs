//! Audit ledger node storage.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditNodeKind {
    Leaf,
    Internal,
}

impl AuditNodeKind {
    fn parse(s: &str) -> DbResult<Self> {
        match s {
            "leaf" => Ok(AuditNodeKind::Leaf),
            "internal" => Ok(AuditNodeKind::Internal),
            other => Err(DbError::Constraint(format!("Unknown audit node type: {}", other))),
        }
    }
}

/// A stored ledger node. Leaves carry an activity entry; internal nodes
/// carry child hashes.
#[derive(Debug, Clone)]
pub struct AuditNode {
    pub hash: String,
    pub kind: AuditNodeKind,
    pub left_child: Option<String>,
    pub right_child: Option<String>,
    pub payload: Option<String>,
    pub case_id: Option<String>,
    pub created_at: String,
}

/// Current ledger root.
#[derive(Debug, Clone)]
pub struct AuditRootState {
    pub root_hash: Option<String>,
    pub tree_height: u32,
    pub leaf_count: u32,
    pub updated_at: String,
}

const NODE_COLUMNS: &str =
    "hash, node_type, left_child, right_child, payload, case_id, created_at";

fn read_node(row: &Row<'_>) -> rusqlite::Result<(AuditNode, String)> {
    let kind: String = row.get(1)?;
    Ok((
        AuditNode {
            hash: row.get(0)?,
            kind: AuditNodeKind::Leaf,
            left_child: row.get(2)?,
            right_child: row.get(3)?,
            payload: row.get(4)?,
            case_id: row.get(5)?,
            created_at: row.get(6)?,
        },
        kind,
    ))
}

fn finish_node((mut node, kind): (AuditNode, String)) -> DbResult<AuditNode> {
    node.kind = AuditNodeKind::parse(&kind)?;
    Ok(node)
}

impl Database {
    /// Insert a leaf holding one serialized activity entry.
    pub fn insert_audit_leaf(&self, hash: &str, payload: &str, case_id: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO audit_nodes (hash, node_type, payload, case_id) VALUES (?, 'leaf', ?, ?)",
            params![hash, payload, case_id],
        )?;
        Ok(())
    }

    pub fn insert_audit_internal(
        &self,
        hash: &str,
        left_child: &str,
        right_child: Option<&str>,
    ) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO audit_nodes (hash, node_type, left_child, right_child) VALUES (?, 'internal', ?, ?)",
            params![hash, left_child, right_child],
        )?;
        Ok(())
    }

    pub fn get_audit_node(&self, hash: &str) -> DbResult<Option<AuditNode>> {
        let sql = format!("SELECT {} FROM audit_nodes WHERE hash = ?", NODE_COLUMNS);
        self.conn
            .query_row(&sql, [hash], read_node)
            .optional()?
            .map(finish_node)
            .transpose()
    }

    pub fn audit_node_exists(&self, hash: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM audit_nodes WHERE hash = ?",
            [hash],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_audit_root(&self) -> DbResult<AuditRootState> {
        self.conn
            .query_row(
                "SELECT root_hash, tree_height, leaf_count, updated_at FROM audit_root WHERE id = 1",
                [],
                |row| {
                    Ok(AuditRootState {
                        root_hash: row.get(0)?,
                        tree_height: row.get(1)?,
                        leaf_count: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .map_err(Into::into)
    }

    pub fn update_audit_root(
        &self,
        root_hash: &str,
        tree_height: u32,
        leaf_count: u32,
    ) -> DbResult<()> {
        self.conn.execute(
            r#"
            UPDATE audit_root
            SET root_hash = ?, tree_height = ?, leaf_count = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = 1
            "#,
            params![root_hash, tree_height, leaf_count],
        )?;
        Ok(())
    }

    /// All leaf hashes in commit order.
    pub fn get_all_audit_leaf_hashes(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT hash FROM audit_nodes WHERE node_type = 'leaf' ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Leaves committed for one case, in commit order.
    pub fn get_audit_leaves_for_case(&self, case_id: &str) -> DbResult<Vec<AuditNode>> {
        let sql = format!(
            "SELECT {} FROM audit_nodes WHERE node_type = 'leaf' AND case_id = ? ORDER BY rowid",
            NODE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([case_id], read_node)?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(finish_node(row?)?);
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get_leaf() {
        let db = setup_db();

        db.insert_audit_leaf("hash123", r#"{"action":"Case Created"}"#, "case_1")
            .unwrap();

        let node = db.get_audit_node("hash123").unwrap().unwrap();
        assert_eq!(node.kind, AuditNodeKind::Leaf);
        assert_eq!(node.case_id.as_deref(), Some("case_1"));
        assert!(node.left_child.is_none());
        assert!(node.right_child.is_none());
    }

    #[test]
    fn test_insert_and_get_internal() {
        let db = setup_db();

        db.insert_audit_leaf("leaf1", "payload1", "case_1").unwrap();
        db.insert_audit_leaf("leaf2", "payload2", "case_1").unwrap();
        db.insert_audit_internal("internal1", "leaf1", Some("leaf2"))
            .unwrap();

        let node = db.get_audit_node("internal1").unwrap().unwrap();
        assert_eq!(node.kind, AuditNodeKind::Internal);
        assert_eq!(node.left_child.as_deref(), Some("leaf1"));
        assert_eq!(node.right_child.as_deref(), Some("leaf2"));
        assert!(node.payload.is_none());
    }

    #[test]
    fn test_root_state() {
        let db = setup_db();

        let state = db.get_audit_root().unwrap();
        assert!(state.root_hash.is_none());
        assert_eq!(state.leaf_count, 0);

        db.insert_audit_leaf("leaf1", "payload", "case_1").unwrap();
        db.update_audit_root("leaf1", 1, 1).unwrap();

        let state = db.get_audit_root().unwrap();
        assert_eq!(state.root_hash.as_deref(), Some("leaf1"));
        assert_eq!(state.tree_height, 1);
        assert_eq!(state.leaf_count, 1);
    }

    #[test]
    fn test_leaf_order_and_case_filter() {
        let db = setup_db();

        db.insert_audit_leaf("zzz", "p1", "case_a").unwrap();
        db.insert_audit_leaf("aaa", "p2", "case_b").unwrap();
        db.insert_audit_leaf("mmm", "p3", "case_a").unwrap();

        // Commit order, not hash order
        assert_eq!(db.get_all_audit_leaf_hashes().unwrap(), vec!["zzz", "aaa", "mmm"]);

        let leaves: Vec<String> = db
            .get_audit_leaves_for_case("case_a")
            .unwrap()
            .into_iter()
            .map(|n| n.hash)
            .collect();
        assert_eq!(leaves, vec!["zzz", "mmm"]);
        assert!(db.audit_node_exists("aaa").unwrap());
        assert!(!db.audit_node_exists("bbb").unwrap());
    }
}
