//! SQL schema for the Demeter SQLite store.
//!
//! Executed at connection startup. Idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`; future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS ingredient (
    ingredient_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient_instruction TEXT,
    ingredient_name        TEXT
);

-- base_ingredient_id is used when preparing result_ingredient_id.
-- The tree view of an ingredient is rebuilt from these rows on read.
CREATE TABLE IF NOT EXISTS component_of (
    base_ingredient_id   INTEGER NOT NULL
        REFERENCES ingredient(ingredient_id) ON DELETE CASCADE,
    result_ingredient_id INTEGER NOT NULL
        REFERENCES ingredient(ingredient_id) ON DELETE CASCADE,
    UNIQUE (base_ingredient_id, result_ingredient_id)
);

CREATE TABLE IF NOT EXISTS recipe (
    recipe_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_title       TEXT,
    recipe_cook_time   INTEGER,
    recipe_prep_time   INTEGER,
    recipe_quantity    INTEGER,
    root_ingredient_id INTEGER REFERENCES ingredient(ingredient_id)
);

CREATE TABLE IF NOT EXISTS category (
    category_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name        TEXT,
    category_description TEXT
);

-- Written once, on the insert that first persists the recipe.
CREATE TABLE IF NOT EXISTS recipe_created (
    recipe_id      INTEGER NOT NULL UNIQUE
        REFERENCES recipe(recipe_id) ON DELETE CASCADE,
    recipe_created TEXT NOT NULL   -- ISO 8601 UTC
);

-- Overwritten on every save.
CREATE TABLE IF NOT EXISTS recipe_last_updated (
    recipe_id      INTEGER NOT NULL UNIQUE
        REFERENCES recipe(recipe_id) ON DELETE CASCADE,
    recipe_updated TEXT NOT NULL   -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS component_of_result_idx ON component_of(result_ingredient_id);
CREATE INDEX IF NOT EXISTS recipe_root_idx         ON recipe(root_ingredient_id);

PRAGMA user_version = 1;
";
