use crate::catalog::{Backend, IndexSource, RetryPolicy, WingetSource};
use crate::provider::DEFAULT_INSTALL_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Winget,
    Index,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub winget_program: String,
    pub index_path: PathBuf,
    /// 首次连接失败后的额外重试次数
    pub connect_retries: u32,
    pub retry_delay_ms: u64,
    pub install_prefix: String,
}

fn config_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/lian-cnf")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Winget,
            winget_program: "winget".to_string(),
            index_path: config_dir().join("index.toml"),
            connect_retries: 3,
            retry_delay_ms: 0,
            install_prefix: DEFAULT_INSTALL_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// 读取配置文件；未指定路径且默认位置不存在时使用默认配置
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::default_path();
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("读取配置文件失败: {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", config_path.display()))?;
        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.connect_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn backend(&self) -> Backend {
        match self.backend {
            BackendKind::Winget => Backend::Winget(WingetSource::new(&self.winget_program)),
            BackendKind::Index => Backend::Index(IndexSource::new(&self.index_path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"index\"\nindex_path = \"/tmp/pkgs.toml\"\nretry_delay_ms = 50").unwrap();

        let config = Config::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.backend, BackendKind::Index);
        assert_eq!(config.index_path, PathBuf::from("/tmp/pkgs.toml"));
        assert_eq!(config.connect_retries, 3);
        assert_eq!(config.install_prefix, "winget install --id");

        let policy = config.retry_policy();
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.delay, Duration::from_millis(50));
        assert!(matches!(config.backend(), Backend::Index(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_or_default(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"apt\"").unwrap();
        assert!(Config::load_or_default(Some(file.path())).is_err());
    }
}
