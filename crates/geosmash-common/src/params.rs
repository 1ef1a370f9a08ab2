//! Tunable numeric parameters.
//!
//! All gameplay constants live in a flat key → float table keyed by
//! dot-separated paths (`charlie.upSpecialAttack.xvel`). Tables are authored
//! either as TOML, where nested tables flatten into dotted keys, or in the
//! legacy plain-text format:
//!
//! ```text
//! # comment
//! input.deadzone 0.2
//! charlie.walkSpeed 150
//! ```
//!
//! Per-fighter lookups go through a [`ParamScope`], which prepends the
//! fighter's prefix to every key.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use glam::Vec2;
use tracing::{debug, info};

use crate::error::{ParamError, ParamResult};

/// Flat table of tunable parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamTable {
    values: AHashMap<String, f32>,
}

impl ParamTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table from disk.
    ///
    /// Files ending in `.toml` are read as TOML; anything else uses the
    /// plain-text `key value` format.
    pub fn load<P: AsRef<Path>>(path: P) -> ParamResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let table = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml_str(&contents)?
        } else {
            Self::parse_text(&contents)?
        };
        info!("Loaded {} parameters from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parses the plain-text `key value` format.
    pub fn parse_text(contents: &str) -> ParamResult<Self> {
        let mut table = Self::new();
        for (index, raw) in contents.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(ParamError::Malformed {
                    line: index + 1,
                    content: raw.to_string(),
                });
            };
            let value: f32 = value.parse().map_err(|_| ParamError::NotANumber {
                key: key.to_string(),
            })?;
            table.insert(key, value)?;
        }
        debug!("Parsed {} plain-text parameters", table.len());
        Ok(table)
    }

    /// Parses TOML, flattening nested tables into dotted keys.
    pub fn from_toml_str(contents: &str) -> ParamResult<Self> {
        let root: toml::Table = toml::from_str(contents)?;
        let mut table = Self::new();
        table.flatten_toml("", &root)?;
        debug!("Parsed {} TOML parameters", table.len());
        Ok(table)
    }

    fn flatten_toml(&mut self, prefix: &str, node: &toml::Table) -> ParamResult<()> {
        for (name, value) in node {
            let key = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match value {
                toml::Value::Table(child) => self.flatten_toml(&key, child)?,
                toml::Value::Float(f) => self.insert(&key, *f as f32)?,
                toml::Value::Integer(i) => self.insert(&key, *i as f32)?,
                toml::Value::Boolean(b) => self.insert(&key, if *b { 1.0 } else { 0.0 })?,
                _ => return Err(ParamError::NotANumber { key }),
            }
        }
        Ok(())
    }

    /// Adds a new parameter. Redefining a key is an error.
    pub fn insert(&mut self, key: &str, value: f32) -> ParamResult<()> {
        if self.values.contains_key(key) {
            return Err(ParamError::Duplicate {
                key: key.to_string(),
            });
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Sets a parameter, replacing any existing value.
    pub fn set(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    /// Copies every entry of `other` into this table, replacing on conflict.
    pub fn overlay(&mut self, other: &ParamTable) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), *value);
        }
    }

    /// Reads a parameter by its fully qualified key.
    pub fn get(&self, key: &str) -> ParamResult<f32> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| ParamError::Missing {
                key: key.to_string(),
            })
    }

    /// Checks if a key is defined.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a view that prepends `prefix.` to every lookup.
    #[must_use]
    pub fn scoped(&self, prefix: &str) -> ParamScope<'_> {
        ParamScope {
            table: self,
            prefix: prefix.to_string(),
        }
    }

    /// Returns every key that is absent from the table.
    #[must_use]
    pub fn missing<'k>(&self, keys: &[&'k str]) -> Vec<&'k str> {
        keys.iter().copied().filter(|k| !self.contains(k)).collect()
    }
}

/// Prefix-namespaced view into a [`ParamTable`].
#[derive(Debug, Clone)]
pub struct ParamScope<'a> {
    table: &'a ParamTable,
    prefix: String,
}

impl<'a> ParamScope<'a> {
    /// Returns the prefix of this scope.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the underlying table.
    #[must_use]
    pub fn table(&self) -> &'a ParamTable {
        self.table
    }

    /// Reads `prefix.name`.
    pub fn param(&self, name: &str) -> ParamResult<f32> {
        self.table.get(&self.key(name))
    }

    /// Reads `prefix.name`, falling back to a default when absent.
    pub fn param_or(&self, name: &str, default: f32) -> f32 {
        self.param(name).unwrap_or(default)
    }

    /// Reads two parameters as a vector.
    pub fn vec2(&self, x: &str, y: &str) -> ParamResult<Vec2> {
        Ok(Vec2::new(self.param(x)?, self.param(y)?))
    }

    /// Reads a strictly positive duration or size.
    pub fn positive(&self, name: &str) -> ParamResult<f32> {
        let value = self.param(name)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(ParamError::Invalid {
                key: self.key(name),
                reason: format!("must be positive, got {value}"),
            })
        }
    }

    /// Returns a nested scope (`prefix.sub`).
    #[must_use]
    pub fn scoped(&self, sub: &str) -> ParamScope<'a> {
        ParamScope {
            table: self.table,
            prefix: self.key(sub),
        }
    }

    /// Checks if `prefix.name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(&self.key(name))
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_text_skips_comments() {
        let table = ParamTable::parse_text(
            "# header\n\ninput.deadzone 0.25   # trailing\ncharlie.w 40\n",
        )
        .expect("valid");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("input.deadzone").ok(), Some(0.25));
    }

    #[test]
    fn test_parse_text_rejects_duplicates() {
        let err = ParamTable::parse_text("a 1\na 2\n").expect_err("duplicate");
        assert!(matches!(err, ParamError::Duplicate { key } if key == "a"));
    }

    #[test]
    fn test_parse_text_rejects_garbage() {
        assert!(matches!(
            ParamTable::parse_text("a b c\n"),
            Err(ParamError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            ParamTable::parse_text("a fast\n"),
            Err(ParamError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_toml_flattening() {
        let table = ParamTable::from_toml_str(
            r#"
            [input]
            deadzone = 0.2

            [charlie]
            walkSpeed = 150
            [charlie.upSpecialAttack]
            xvel = 120.5
            twinkle = true
            "#,
        )
        .expect("valid");

        assert_eq!(table.get("input.deadzone").ok(), Some(0.2));
        assert_eq!(table.get("charlie.walkSpeed").ok(), Some(150.0));
        assert_eq!(table.get("charlie.upSpecialAttack.xvel").ok(), Some(120.5));
        assert_eq!(table.get("charlie.upSpecialAttack.twinkle").ok(), Some(1.0));
    }

    #[test]
    fn test_toml_rejects_strings() {
        let err = ParamTable::from_toml_str("[a]\nb = \"fast\"\n").expect_err("string leaf");
        assert!(matches!(err, ParamError::NotANumber { key } if key == "a.b"));
    }

    #[test]
    fn test_missing_key_is_reported_with_prefix() {
        let table = ParamTable::new();
        let err = table.scoped("stickman").param("walkSpeed").expect_err("missing");
        assert!(matches!(err, ParamError::Missing { key } if key == "stickman.walkSpeed"));
    }

    #[test]
    fn test_nested_scope_and_vec2() {
        let mut table = ParamTable::new();
        table.set("charlie.sideTilt.hitboxx", 3.0);
        table.set("charlie.sideTilt.hitboxy", -1.0);
        let scope = table.scoped("charlie").scoped("sideTilt");

        assert_eq!(scope.prefix(), "charlie.sideTilt");
        assert_eq!(scope.vec2("hitboxx", "hitboxy").ok(), Some(Vec2::new(3.0, -1.0)));
        assert_eq!(scope.param_or("absent", 7.0), 7.0);
    }

    #[test]
    fn test_positive_rejects_zero() {
        let mut table = ParamTable::new();
        table.set("dodge.duration", 0.0);
        assert!(matches!(
            table.scoped("dodge").positive("duration"),
            Err(ParamError::Invalid { .. })
        ));
    }

    #[test]
    fn test_load_from_disk_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");

        let toml_path = dir.path().join("params.toml");
        let mut file = fs::File::create(&toml_path).expect("create");
        writeln!(file, "[fighter]\ngbThresh = 50.0").expect("write");
        let table = ParamTable::load(&toml_path).expect("toml load");
        assert_eq!(table.get("fighter.gbThresh").ok(), Some(50.0));

        let text_path = dir.path().join("params.txt");
        fs::write(&text_path, "fighter.gbThresh 60\n").expect("write");
        let table = ParamTable::load(&text_path).expect("text load");
        assert_eq!(table.get("fighter.gbThresh").ok(), Some(60.0));
    }

    #[test]
    fn test_overlay_replaces() {
        let mut base = ParamTable::parse_text("a 1\nb 2\n").expect("valid");
        let patch = ParamTable::parse_text("b 5\n").expect("valid");
        base.overlay(&patch);
        assert_eq!(base.get("b").ok(), Some(5.0));
        assert_eq!(base.missing(&["a", "c"]), vec!["c"]);
    }
}
