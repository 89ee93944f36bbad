//! 包目录模块 — 对 winget 目录与本地索引的封装

pub mod index;
pub mod parser;
pub mod types;
pub mod winget;

// 重新导出常用类型
pub use index::{IndexCatalog, IndexSource};
pub use types::{
    ConnectStatus, Connection, MatchCriteria, MatchField, MatchMode, Package, PackageMatch,
    PackageQuery,
};
pub use winget::{WingetCatalog, WingetSource};

use crate::error::{CatalogError, Result};
use std::time::Duration;

/// 已连接的目录：每次查询接收一个不可变的过滤条件，不保留查询状态
pub trait Catalog {
    fn find_packages(&self, query: &PackageQuery) -> Result<Vec<PackageMatch>>;
}

/// 可连接的目录来源
pub trait CatalogSource {
    type Catalog: Catalog;

    fn connect(&self) -> Connection<Self::Catalog>;
}

impl<C: Catalog> Connection<C> {
    /// 在（可能已降级的）连接上执行查询
    pub fn find_packages(&self, query: &PackageQuery) -> Result<Vec<PackageMatch>> {
        match &self.catalog {
            Some(catalog) => catalog.find_packages(query),
            None => Err(CatalogError::NotConnected),
        }
    }
}

/// 连接重试策略：首次失败后额外重试 `retries` 次
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::ZERO,
        }
    }
}

/// 连接目录，状态非 Ok 时按策略重试。
///
/// 重试耗尽后直接返回最后一次的结果，不视为致命错误；
/// 下游查询会得到 `NotConnected` 或空结果，最终表现为“无建议”。
pub fn connect_with_retry<S: CatalogSource>(
    source: &S,
    policy: &RetryPolicy,
) -> Connection<S::Catalog> {
    let mut connection = source.connect();
    let mut attempt = 0;
    while !connection.is_ok() && attempt < policy.retries {
        attempt += 1;
        log::warn!("目录连接失败 ({:?})，第 {} 次重试", connection.status, attempt);
        if !policy.delay.is_zero() {
            std::thread::sleep(policy.delay);
        }
        connection = source.connect();
    }
    if !connection.is_ok() {
        log::warn!("重试 {} 次后目录仍不可用，继续使用降级连接", policy.retries);
    }
    connection
}

/// 运行时选择的目录后端
#[derive(Debug, Clone)]
pub enum Backend {
    Winget(WingetSource),
    Index(IndexSource),
}

impl Backend {
    /// 后端当前是否可用；不可用时不向宿主注册提供者
    pub fn is_available(&self) -> bool {
        match self {
            Backend::Winget(source) => source.is_available(),
            Backend::Index(source) => source.path.is_file(),
        }
    }
}

/// `Backend` 连接后得到的目录
#[derive(Debug)]
pub enum BackendCatalog {
    Winget(WingetCatalog),
    Index(IndexCatalog),
}

impl Catalog for BackendCatalog {
    fn find_packages(&self, query: &PackageQuery) -> Result<Vec<PackageMatch>> {
        match self {
            BackendCatalog::Winget(c) => c.find_packages(query),
            BackendCatalog::Index(c) => c.find_packages(query),
        }
    }
}

impl CatalogSource for Backend {
    type Catalog = BackendCatalog;

    fn connect(&self) -> Connection<BackendCatalog> {
        let (status, catalog) = match self {
            Backend::Winget(source) => {
                let conn = source.connect();
                (conn.status, conn.catalog.map(BackendCatalog::Winget))
            }
            Backend::Index(source) => {
                let conn = source.connect();
                (conn.status, conn.catalog.map(BackendCatalog::Index))
            }
        };
        Connection { status, catalog }
    }
}
