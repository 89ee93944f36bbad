//! 本地 TOML 包索引
//!
//! 格式：
//! ```toml
//! [[package]]
//! id = "Git.Git"
//! name = "Git"
//! commands = ["git", "gitk"]
//! ```

use super::types::{
    Connection, MatchCriteria, MatchField, Package, PackageMatch, PackageQuery,
};
use super::{Catalog, CatalogSource};
use crate::error::{CatalogError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 索引中的一条记录
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub commands: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default, rename = "package")]
    packages: Vec<IndexEntry>,
}

/// 已加载到内存的索引，按文件中的顺序返回结果
#[derive(Debug, Clone, Default)]
pub struct IndexCatalog {
    entries: Vec<IndexEntry>,
}

impl IndexCatalog {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: IndexFile = toml::from_str(&content).map_err(|source| {
            CatalogError::IndexParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::new(file.packages))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn match_entry(entry: &IndexEntry, query: &PackageQuery) -> Option<MatchCriteria> {
        let text = query.value.as_str();
        let value = match query.field {
            MatchField::Name => {
                if !query.mode.accepts(&entry.name, text) {
                    return None;
                }
                entry.name.clone()
            }
            MatchField::Command => {
                // 同一个包有多个命令命中时，优先取与查询相同的，其次取最短的
                entry
                    .commands
                    .iter()
                    .filter(|c| query.mode.accepts(c, text))
                    .min_by_key(|c| (!c.eq_ignore_ascii_case(text), c.chars().count()))?
                    .clone()
            }
        };
        Some(MatchCriteria::new(
            query.field,
            query.mode.reported_for(&value, text),
            value,
        ))
    }
}

impl Catalog for IndexCatalog {
    fn find_packages(&self, query: &PackageQuery) -> Result<Vec<PackageMatch>> {
        let matches = self
            .entries
            .iter()
            .filter_map(|entry| {
                Self::match_entry(entry, query).map(|criteria| {
                    PackageMatch::new(Package::new(&entry.id, &entry.name), criteria)
                })
            })
            .collect();
        Ok(matches)
    }
}

/// 每次连接时重新读取索引文件
#[derive(Debug, Clone)]
pub struct IndexSource {
    pub path: PathBuf,
}

impl IndexSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for IndexSource {
    type Catalog = IndexCatalog;

    fn connect(&self) -> Connection<IndexCatalog> {
        match IndexCatalog::load(&self.path) {
            Ok(catalog) => {
                log::debug!("已加载包索引 {} ({} 个包)", self.path.display(), catalog.len());
                Connection::ok(catalog)
            }
            Err(e) => {
                log::warn!("加载包索引失败: {}", e);
                Connection::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MatchMode;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[package]]
id = "Git.Git"
name = "Git"
commands = ["gitk", "git"]

[[package]]
id = "GitHub.cli"
name = "GitHub CLI"
commands = ["gh"]

[[package]]
id = "JesseDuffield.lazygit"
name = "lazygit"
commands = ["lazygit"]
"#;

    fn sample_catalog() -> IndexCatalog {
        let file: IndexFile = toml::from_str(SAMPLE).unwrap();
        IndexCatalog::new(file.packages)
    }

    #[test]
    fn test_command_prefix_prefers_exact_command() {
        let catalog = sample_catalog();
        let query = PackageQuery::new(MatchField::Command, MatchMode::StartsWithCaseInsensitive, "git");
        let matches = catalog.find_packages(&query).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].package.id, "Git.Git");
        assert_eq!(matches[0].criteria.value, "git");
        assert_eq!(matches[0].criteria.mode, MatchMode::Equals);
    }

    #[test]
    fn test_command_prefix_keeps_requested_mode() {
        let catalog = sample_catalog();
        let query = PackageQuery::new(MatchField::Command, MatchMode::StartsWithCaseInsensitive, "GI");
        let matches = catalog.find_packages(&query).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].criteria.value, "git");
        assert_eq!(matches[0].criteria.mode, MatchMode::StartsWithCaseInsensitive);
    }

    #[test]
    fn test_command_prefix_reports_shortest_command() {
        let catalog = IndexCatalog::new(vec![IndexEntry {
            id: "Python.Python.3.12".to_string(),
            name: "Python 3.12".to_string(),
            commands: vec!["python3.12".to_string(), "pythonw".to_string(), "python3".to_string()],
        }]);
        let query = PackageQuery::new(MatchField::Command, MatchMode::StartsWithCaseInsensitive, "pyth");
        let matches = catalog.find_packages(&query).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].criteria.value, "python3");
        assert_eq!(matches[0].criteria.mode, MatchMode::StartsWithCaseInsensitive);
    }

    #[test]
    fn test_name_contains_in_file_order() {
        let catalog = sample_catalog();
        let query = PackageQuery::new(MatchField::Name, MatchMode::ContainsCaseInsensitive, "git");
        let ids: Vec<String> = catalog
            .find_packages(&query)
            .unwrap()
            .into_iter()
            .map(|m| m.package.id)
            .collect();

        assert_eq!(ids, vec!["Git.Git", "GitHub.cli", "JesseDuffield.lazygit"]);
    }

    #[test]
    fn test_source_connects_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let conn = IndexSource::new(file.path()).connect();
        assert!(conn.is_ok());
        assert_eq!(conn.catalog.unwrap().len(), 3);
    }

    #[test]
    fn test_source_missing_file_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let conn = IndexSource::new(dir.path().join("missing.toml")).connect();
        assert!(!conn.is_ok());
        assert!(conn.catalog.is_none());
    }

    #[test]
    fn test_load_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[package]]\nname = 3\n").unwrap();

        let err = IndexCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::IndexParse { .. }));
    }
}
