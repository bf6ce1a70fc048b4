//! SQLite schema definition.

/// Complete database schema for medtour.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Hospitals
-- ============================================================================

CREATE TABLE IF NOT EXISTS hospitals (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    bed_capacity INTEGER NOT NULL DEFAULT 0,
    available_beds INTEGER NOT NULL DEFAULT 0,
    specialties TEXT NOT NULL DEFAULT '[]',       -- JSON array of strings
    accreditation TEXT,
    contact TEXT NOT NULL DEFAULT '{}',           -- JSON HospitalContact
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_hospitals_name ON hospitals(name);

-- ============================================================================
-- Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE COLLATE NOCASE,
    credential_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'agent', 'client', 'hospital', 'finance')),
    full_name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    password_changed INTEGER NOT NULL DEFAULT 0,
    hospital_ids TEXT NOT NULL DEFAULT '[]',      -- JSON array of hospital IDs
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

-- ============================================================================
-- Cases (aggregate stored as scalar columns + JSON sub-documents)
-- ============================================================================

CREATE TABLE IF NOT EXISTS cases (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL DEFAULT 'new',
    priority TEXT NOT NULL DEFAULT 'medium',
    patient_name TEXT NOT NULL,
    created_by TEXT NOT NULL,
    client_user_id TEXT,
    assigned_hospital TEXT,                       -- integrity enforced by the registry, not FK
    assigned_university TEXT,
    client_info TEXT NOT NULL,                    -- JSON ClientInfo
    attender_info TEXT,                           -- JSON AttenderInfo
    treatment_plan TEXT,                          -- JSON TreatmentPlan
    visa TEXT NOT NULL,                           -- JSON VisaInfo
    documents TEXT NOT NULL DEFAULT '[]',         -- JSON array of Document
    payments TEXT NOT NULL DEFAULT '[]',          -- JSON array of PaymentRecord
    comments TEXT NOT NULL DEFAULT '[]',          -- JSON array of Comment
    status_history TEXT NOT NULL DEFAULT '[]',    -- JSON array, append-only
    activity_log TEXT NOT NULL DEFAULT '[]',      -- JSON array, append-only
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cases_status ON cases(status);
CREATE INDEX IF NOT EXISTS idx_cases_hospital ON cases(assigned_hospital);
CREATE INDEX IF NOT EXISTS idx_cases_created_by ON cases(created_by);
CREATE INDEX IF NOT EXISTS idx_cases_client_user ON cases(client_user_id);

-- ============================================================================
-- Notifications
-- ============================================================================

CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'info' CHECK (kind IN ('info', 'success', 'warning', 'error')),
    read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    link TEXT,
    case_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, read);

-- ============================================================================
-- Audit ledger (Merkle tree over activity log entries, append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS audit_nodes (
    hash TEXT PRIMARY KEY,                        -- SHA-256 of content or children
    node_type TEXT NOT NULL CHECK (node_type IN ('leaf', 'internal')),
    left_child TEXT REFERENCES audit_nodes(hash),
    right_child TEXT REFERENCES audit_nodes(hash),
    payload TEXT,                                 -- JSON ActivityLogEntry (leaf only)
    case_id TEXT,                                 -- leaf only
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

-- Ensure leaves have payload, internals have children
CREATE TRIGGER IF NOT EXISTS audit_nodes_check_leaf BEFORE INSERT ON audit_nodes
WHEN new.node_type = 'leaf'
BEGIN
    SELECT CASE
        WHEN new.payload IS NULL THEN
            RAISE(ABORT, 'Leaf nodes must have payload')
        WHEN new.left_child IS NOT NULL OR new.right_child IS NOT NULL THEN
            RAISE(ABORT, 'Leaf nodes cannot have children')
    END;
END;

CREATE TRIGGER IF NOT EXISTS audit_nodes_check_internal BEFORE INSERT ON audit_nodes
WHEN new.node_type = 'internal'
BEGIN
    SELECT CASE
        WHEN new.left_child IS NULL THEN
            RAISE(ABORT, 'Internal nodes must have left child')
        WHEN new.payload IS NOT NULL THEN
            RAISE(ABORT, 'Internal nodes cannot have payload')
    END;
END;

-- Ledger entries are never edited or removed
CREATE TRIGGER IF NOT EXISTS audit_nodes_no_update BEFORE UPDATE ON audit_nodes
BEGIN
    SELECT RAISE(ABORT, 'Audit nodes are immutable');
END;

CREATE TRIGGER IF NOT EXISTS audit_nodes_no_delete BEFORE DELETE ON audit_nodes
BEGIN
    SELECT RAISE(ABORT, 'Audit nodes are immutable');
END;

CREATE INDEX IF NOT EXISTS idx_audit_type ON audit_nodes(node_type);
CREATE INDEX IF NOT EXISTS idx_audit_case ON audit_nodes(case_id);

-- Current root (single row, updated atomically)
CREATE TABLE IF NOT EXISTS audit_root (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    root_hash TEXT REFERENCES audit_nodes(hash),
    tree_height INTEGER NOT NULL DEFAULT 0,
    leaf_count INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

-- Initialize with empty tree state
INSERT OR IGNORE INTO audit_root (id, root_hash, tree_height, leaf_count)
VALUES (1, NULL, 0, 0);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_username_unique_ignoring_case() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO users (id, username, credential_hash, role, full_name) VALUES ('u1', 'Alice', 'x', 'agent', 'Alice')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO users (id, username, credential_hash, role, full_name) VALUES ('u2', 'ALICE', 'x', 'agent', 'Alice 2')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_audit_leaf_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        // Leaf without payload should fail
        let result = conn.execute(
            "INSERT INTO audit_nodes (hash, node_type) VALUES ('abc', 'leaf')",
            [],
        );
        assert!(result.is_err());

        // Leaf with children should fail
        let result = conn.execute(
            "INSERT INTO audit_nodes (hash, node_type, left_child, payload) VALUES ('abc', 'leaf', 'def', 'test')",
            [],
        );
        assert!(result.is_err());

        // Valid leaf should succeed
        let result = conn.execute(
            "INSERT INTO audit_nodes (hash, node_type, payload) VALUES ('abc', 'leaf', 'test payload')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_audit_nodes_immutable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO audit_nodes (hash, node_type, payload) VALUES ('leaf1', 'leaf', 'payload1')",
            [],
        )
        .unwrap();

        assert!(conn
            .execute("UPDATE audit_nodes SET payload = 'x' WHERE hash = 'leaf1'", [])
            .is_err());
        assert!(conn
            .execute("DELETE FROM audit_nodes WHERE hash = 'leaf1'", [])
            .is_err());
    }

    #[test]
    fn test_role_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO users (id, username, credential_hash, role, full_name) VALUES ('u1', 'bob', 'x', 'superuser', 'Bob')",
            [],
        );
        assert!(result.is_err());
    }
}
