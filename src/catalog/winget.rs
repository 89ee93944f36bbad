//! 通过 `winget search` 子进程查询 winget 社区目录

use super::parser::{is_no_results, parse_search_output};
use super::types::{Connection, MatchCriteria, MatchMode, Package, PackageMatch, PackageQuery};
use super::{Catalog, CatalogSource};
use crate::error::{CatalogError, Result};
use std::process::Command;

/// 预置的社区目录名
const WINGET_SOURCE: &str = "winget";

/// APPINSTALLER_CLI_ERROR_NO_APPLICATIONS_FOUND (0x8A150014)
const NO_APPLICATIONS_FOUND: i32 = 0x8A15_0014_u32 as i32;

/// winget 没有找到任何包；提示文本会被本地化，所以优先看退出码。
/// 非 Windows 平台上退出码只保留低 8 位。
fn is_no_applications_found(code: Option<i32>, stdout: &str) -> bool {
    match code {
        Some(c) if c == NO_APPLICATIONS_FOUND || c == NO_APPLICATIONS_FOUND & 0xff => true,
        _ => is_no_results(stdout),
    }
}

#[derive(Debug, Clone)]
pub struct WingetSource {
    pub program: String,
}

impl Default for WingetSource {
    fn default() -> Self {
        Self::new("winget")
    }
}

impl WingetSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// winget 可执行文件是否可用
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl CatalogSource for WingetSource {
    type Catalog = WingetCatalog;

    fn connect(&self) -> Connection<WingetCatalog> {
        if self.is_available() {
            Connection::ok(WingetCatalog {
                program: self.program.clone(),
            })
        } else {
            log::warn!("{} --version 执行失败，目录不可用", self.program);
            Connection::failed()
        }
    }
}

#[derive(Debug, Clone)]
pub struct WingetCatalog {
    program: String,
}

impl WingetCatalog {
    fn search_args(query: &PackageQuery) -> Vec<String> {
        let mut args = vec![
            "search".to_string(),
            query.field.search_flag().to_string(),
            query.value.clone(),
            "--source".to_string(),
            WINGET_SOURCE.to_string(),
            "--disable-interactivity".to_string(),
            "--accept-source-agreements".to_string(),
        ];
        if query.mode == MatchMode::Equals {
            args.push("--exact".to_string());
        }
        args
    }

    /// 把表格行转换为匹配结果；只保留社区目录的行。winget 默认按子串搜索，
    /// 这里按请求的模式再过滤一遍，并还原每一行实际的命中方式。
    fn rows_to_matches(output: &str, query: &PackageQuery) -> Vec<PackageMatch> {
        parse_search_output(output)
            .into_iter()
            .filter(|row| row.source.as_deref().map_or(true, |s| s == WINGET_SOURCE))
            .filter(|row| query.mode.accepts(row.matched_value(), &query.value))
            .map(|row| {
                let value = row.matched_value().to_string();
                let mode = query.mode.reported_for(&value, &query.value);
                PackageMatch::new(
                    Package::new(row.id, row.name),
                    MatchCriteria::new(query.field, mode, value),
                )
            })
            .collect()
    }
}

impl Catalog for WingetCatalog {
    fn find_packages(&self, query: &PackageQuery) -> Result<Vec<PackageMatch>> {
        let output = Command::new(&self.program)
            .args(Self::search_args(query))
            .output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            if is_no_applications_found(output.status.code(), &stdout) {
                return Ok(Vec::new());
            }
            return Err(CatalogError::CommandFailed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Self::rows_to_matches(&stdout, query))
    }
}
