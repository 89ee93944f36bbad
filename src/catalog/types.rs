//! 包目录相关数据类型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 目录中的一个可安装包，取回后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
}

impl Package {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// 生成安装命令，如 `winget install --id Git.Git`
    pub fn install_command(&self, prefix: &str) -> String {
        format!("{} {}", prefix.trim_end(), self.id)
    }
}

/// 查询的目标字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    /// 包提供的可执行命令名
    Command,
    /// 包的显示名称
    Name,
}

impl MatchField {
    /// 对应 `winget search` 的过滤参数
    pub fn search_flag(&self) -> &'static str {
        match self {
            MatchField::Command => "--command",
            MatchField::Name => "--name",
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchField::Command => write!(f, "Command"),
            MatchField::Name => write!(f, "Name"),
        }
    }
}

/// 匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    Equals,
    EqualsCaseInsensitive,
    StartsWithCaseInsensitive,
    ContainsCaseInsensitive,
}

impl MatchMode {
    pub fn is_exact(&self) -> bool {
        matches!(self, MatchMode::Equals | MatchMode::EqualsCaseInsensitive)
    }

    /// 判断候选值在该模式下是否命中查询串
    pub fn accepts(&self, candidate: &str, query: &str) -> bool {
        match self {
            MatchMode::Equals => candidate == query,
            MatchMode::EqualsCaseInsensitive => candidate.to_lowercase() == query.to_lowercase(),
            MatchMode::StartsWithCaseInsensitive => {
                candidate.to_lowercase().starts_with(&query.to_lowercase())
            }
            MatchMode::ContainsCaseInsensitive => {
                candidate.to_lowercase().contains(&query.to_lowercase())
            }
        }
    }

    /// 目录报告的实际匹配方式：值与查询完全相同时升级为精确匹配，
    /// 否则保持请求的模式。
    pub fn reported_for(&self, value: &str, query: &str) -> MatchMode {
        if value == query {
            MatchMode::Equals
        } else if value.to_lowercase() == query.to_lowercase() {
            MatchMode::EqualsCaseInsensitive
        } else {
            *self
        }
    }
}

/// 一次查询使用的条件，同时也是目录返回的命中条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub field: MatchField,
    pub mode: MatchMode,
    pub value: String,
}

/// 单次查询的不可变过滤条件，每次查询新建一个
pub type PackageQuery = MatchCriteria;

impl MatchCriteria {
    pub fn new(field: MatchField, mode: MatchMode, value: impl Into<String>) -> Self {
        Self {
            field,
            mode,
            value: value.into(),
        }
    }
}

/// 查询结果条目：包 + 命中它的条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMatch {
    pub package: Package,
    pub criteria: MatchCriteria,
}

impl PackageMatch {
    pub fn new(package: Package, criteria: MatchCriteria) -> Self {
        Self { package, criteria }
    }
}

/// 目录连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Ok,
    CatalogError,
}

/// 一次连接尝试的结果；失败时 `catalog` 为空，但仍可交给下游查询
#[derive(Debug)]
pub struct Connection<C> {
    pub status: ConnectStatus,
    pub catalog: Option<C>,
}

impl<C> Connection<C> {
    pub fn ok(catalog: C) -> Self {
        Self {
            status: ConnectStatus::Ok,
            catalog: Some(catalog),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ConnectStatus::CatalogError,
            catalog: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ConnectStatus::Ok
    }
}
