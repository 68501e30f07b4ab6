use serde::{Deserialize, Serialize};

/// Naming conventions the store reads JSON with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Field holding an object's own content hash (rows, tables, database).
    pub hash_field: String,
    /// Field of a table object holding its array of rows.
    pub rows_field: String,
    /// Suffix marking a reference field. `userHash` links to table `user`.
    pub link_suffix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hash_field: "hash".into(),
            rows_field: "rows".into(),
            link_suffix: "Hash".into(),
        }
    }
}

impl StoreConfig {
    /// If `field` is a reference field, the name of the table it links to.
    ///
    /// The hash field is never a link, and neither is the bare suffix.
    pub fn link_target<'a>(&self, field: &'a str) -> Option<&'a str> {
        if field == self.hash_field || self.link_suffix.is_empty() {
            return None;
        }
        field
            .strip_suffix(self.link_suffix.as_str())
            .filter(|target| !target.is_empty())
    }

    /// Returns `true` if `field` is a reference field.
    pub fn is_link(&self, field: &str) -> bool {
        self.link_target(field).is_some()
    }
}
