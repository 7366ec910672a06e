pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    category_type    TEXT NOT NULL CHECK (category_type IN ('THU', 'CHI')),
    percentage_limit TEXT NOT NULL DEFAULT '0',
    amount           TEXT NOT NULL DEFAULT '0',
    actual_amount    TEXT NOT NULL DEFAULT '0',
    user_id          INTEGER NOT NULL,
    description      TEXT,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);

CREATE TABLE IF NOT EXISTS bills (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    bill_type   TEXT NOT NULL CHECK (bill_type IN ('THU', 'CHI')),
    amount      TEXT NOT NULL,
    date        TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bills_user ON bills(user_id);
CREATE INDEX IF NOT EXISTS idx_bills_category ON bills(category_id);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
