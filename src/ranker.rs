//! 从一次查询的结果中挑选唯一的最佳包

use crate::catalog::{MatchMode, Package, PackageMatch};

/// 选出最佳匹配包。
///
/// 规则（按优先级）：
///   1. 只有一个结果 — 无条件返回
///   2. 存在精确匹配（Equals / EqualsCaseInsensitive）— 返回第一个
///   3. 前缀匹配中命中值最短的一个，长度相同时保留先出现的
///   4. 只剩子串匹配 — 无法判断相关性，不给出建议
pub fn best_match(matches: &[PackageMatch]) -> Option<&Package> {
    if let [only] = matches {
        return Some(&only.package);
    }

    let mut best: Option<&PackageMatch> = None;
    for m in matches {
        if m.criteria.mode.is_exact() {
            return Some(&m.package);
        }
        if m.criteria.mode == MatchMode::StartsWithCaseInsensitive {
            let shorter = best.map_or(true, |b| {
                m.criteria.value.chars().count() < b.criteria.value.chars().count()
            });
            if shorter {
                best = Some(m);
            }
        }
    }

    best.map(|m| &m.package)
}
