//! SQL schema for the lifestream SQLite store.
//!
//! Executed once at connection startup. Every statement is idempotent, so
//! reopening an existing database is a no-op.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` / `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS event_type (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

INSERT OR IGNORE INTO event_type (id, name) VALUES
    (1, 'blog'),
    (2, 'blog-comment'),
    (3, 'book'),
    (4, 'code'),
    (5, 'distance'),
    (6, 'photo'),
    (7, 'video');

-- `datetime` is canonical-zone wall time, '%Y-%m-%d %H:%M:%S'.
-- `metadata` is the verbatim upstream item.
-- Audit columns are RFC 3339 UTC.

CREATE TABLE IF NOT EXISTS blog (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    permalink   TEXT NOT NULL UNIQUE,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS blog_comment (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    permalink   TEXT NOT NULL UNIQUE,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS book (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id     TEXT NOT NULL UNIQUE,
    permalink   TEXT,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS code (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id    TEXT NOT NULL UNIQUE,
    type        TEXT,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS distance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id    TEXT NOT NULL UNIQUE,
    type        TEXT,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

-- The only table that sees UPDATEs (like/comment counts in metadata).
CREATE TABLE IF NOT EXISTS photo (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    media_id    TEXT NOT NULL UNIQUE,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS video (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id    TEXT NOT NULL UNIQUE,
    datetime    TEXT NOT NULL,
    metadata    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE INDEX IF NOT EXISTS blog_datetime_idx         ON blog(datetime);
CREATE INDEX IF NOT EXISTS blog_comment_datetime_idx ON blog_comment(datetime);
CREATE INDEX IF NOT EXISTS book_datetime_idx         ON book(datetime);
CREATE INDEX IF NOT EXISTS code_datetime_idx         ON code(datetime);
CREATE INDEX IF NOT EXISTS distance_datetime_idx     ON distance(datetime);
CREATE INDEX IF NOT EXISTS photo_datetime_idx        ON photo(datetime);
CREATE INDEX IF NOT EXISTS video_datetime_idx        ON video(datetime);

PRAGMA user_version = 1;
";
