mod common;

use common::{hit, ScriptedSource};
use lian_cnf::catalog::{MatchField, MatchMode, RetryPolicy};
use lian_cnf::resolver::{CancelToken, Resolver};
use pretty_assertions::assert_eq;

#[test]
fn test_command_hit_skips_name_search() {
    let source = ScriptedSource::new(
        vec![hit("Git.Git", MatchField::Command, MatchMode::StartsWithCaseInsensitive, "git")],
        vec![hit("Other", MatchField::Name, MatchMode::ContainsCaseInsensitive, "x")],
    );
    let resolver = Resolver::new(source.clone());

    let package = resolver.resolve("gi", &CancelToken::new()).unwrap();
    assert_eq!(package.id, "Git.Git");

    let queries = source.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].field, MatchField::Command);
    assert_eq!(queries[0].mode, MatchMode::StartsWithCaseInsensitive);
    assert_eq!(queries[0].value, "gi");
}

#[test]
fn test_falls_back_to_name_contains_search() {
    let source = ScriptedSource::new(
        Vec::new(),
        vec![hit("JesseDuffield.lazygit", MatchField::Name, MatchMode::ContainsCaseInsensitive, "lazygit")],
    );
    let resolver = Resolver::new(source.clone());

    let package = resolver.resolve("lazyg", &CancelToken::new()).unwrap();
    assert_eq!(package.id, "JesseDuffield.lazygit");

    let queries = source.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].field, MatchField::Name);
    assert_eq!(queries[1].mode, MatchMode::ContainsCaseInsensitive);
    assert_eq!(queries[1].value, "lazyg");
}

#[test]
fn test_ambiguous_command_matches_use_name_phase() {
    // 命令阶段只有子串匹配，无法选出结果，进入名称阶段
    let source = ScriptedSource::new(
        vec![
            hit("A", MatchField::Command, MatchMode::ContainsCaseInsensitive, "xgit"),
            hit("B", MatchField::Command, MatchMode::ContainsCaseInsensitive, "ygit"),
        ],
        vec![
            hit("C", MatchField::Name, MatchMode::ContainsCaseInsensitive, "agit"),
            hit("D", MatchField::Name, MatchMode::ContainsCaseInsensitive, "bgit"),
        ],
    );
    let resolver = Resolver::new(source.clone());

    assert_eq!(resolver.resolve("git", &CancelToken::new()), None);
    assert_eq!(source.queries().len(), 2);
}

#[test]
fn test_offline_catalog_yields_no_suggestion() {
    let source = ScriptedSource::offline();
    let resolver = Resolver::new(source.clone());

    assert_eq!(resolver.resolve("git", &CancelToken::new()), None);
    assert_eq!(source.connects(), 4);
    assert!(source.queries().is_empty());
}

#[test]
fn test_retry_budget_is_configurable() {
    let source = ScriptedSource::offline();
    let policy = RetryPolicy {
        retries: 0,
        ..RetryPolicy::default()
    };
    let resolver = Resolver::with_retry(source.clone(), policy);

    assert_eq!(resolver.resolve("git", &CancelToken::new()), None);
    assert_eq!(source.connects(), 1);
}

#[test]
fn test_cancelled_before_connect() {
    let source = ScriptedSource::new(
        vec![hit("Git.Git", MatchField::Command, MatchMode::Equals, "git")],
        Vec::new(),
    );
    let resolver = Resolver::new(source.clone());
    let cancel = CancelToken::new();
    cancel.cancel();

    assert_eq!(resolver.resolve("git", &cancel), None);
    assert_eq!(source.connects(), 0);
    assert!(resolver.try_resolve("git", &cancel).is_err());
}

#[test]
fn test_blank_query_does_not_touch_catalog() {
    let source = ScriptedSource::new(Vec::new(), Vec::new());
    let resolver = Resolver::new(source.clone());

    assert_eq!(resolver.resolve("   ", &CancelToken::new()), None);
    assert_eq!(source.connects(), 0);
}
