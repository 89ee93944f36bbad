//! 两阶段包解析：先按命令名前缀搜索，再按包名子串搜索

use crate::catalog::{
    connect_with_retry, CatalogSource, Connection, MatchField, MatchMode, Package, PackageQuery,
    RetryPolicy,
};
use crate::error::{CatalogError, Result};
use crate::ranker::best_match;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 外部取消标志，只在查询边界处检查
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CatalogError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// 固定的搜索阶段顺序
const PHASES: [(MatchField, MatchMode); 2] = [
    (MatchField::Command, MatchMode::StartsWithCaseInsensitive),
    (MatchField::Name, MatchMode::ContainsCaseInsensitive),
];

pub struct Resolver<S> {
    source: S,
    retry: RetryPolicy,
}

impl<S: CatalogSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self::with_retry(source, RetryPolicy::default())
    }

    pub fn with_retry(source: S, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// 解析未找到的命令名，任何错误都视为“无建议”
    pub fn resolve(&self, query: &str, cancel: &CancelToken) -> Option<Package> {
        match self.try_resolve(query, cancel) {
            Ok(found) => found,
            Err(CatalogError::Cancelled) => {
                log::debug!("解析 {:?} 已取消", query);
                None
            }
            Err(e) => {
                log::warn!("解析 {:?} 失败: {}", query, e);
                None
            }
        }
    }

    pub fn try_resolve(&self, query: &str, cancel: &CancelToken) -> Result<Option<Package>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        cancel.check()?;
        let connection = connect_with_retry(&self.source, &self.retry);

        for (field, mode) in PHASES {
            cancel.check()?;
            if let Some(package) = Self::search(&connection, PackageQuery::new(field, mode, query))? {
                return Ok(Some(package));
            }
        }

        log::debug!("{:?} 没有可用的匹配", query);
        Ok(None)
    }

    fn search(
        connection: &Connection<S::Catalog>,
        query: PackageQuery,
    ) -> Result<Option<Package>> {
        let matches = connection.find_packages(&query)?;
        let best = best_match(&matches).cloned();
        log::debug!(
            "按 {} ({:?}) 搜索 {:?}: {} 个结果, 选中 {:?}",
            query.field,
            query.mode,
            query.value,
            matches.len(),
            best.as_ref().map(|p| &p.id)
        );
        Ok(best)
    }
}
