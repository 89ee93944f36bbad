#![allow(dead_code)]

use lian_cnf::catalog::{
    Catalog, CatalogSource, Connection, MatchCriteria, MatchField, MatchMode, Package,
    PackageMatch, PackageQuery,
};
use lian_cnf::Result;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    connect_ok: bool,
    connects: u32,
    by_command: Vec<PackageMatch>,
    by_name: Vec<PackageMatch>,
    queries: Vec<PackageQuery>,
}

/// 按字段返回预设结果并记录收到的查询
#[derive(Clone)]
pub struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub fn new(by_command: Vec<PackageMatch>, by_name: Vec<PackageMatch>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                connect_ok: true,
                by_command,
                by_name,
                ..Default::default()
            })),
        }
    }

    pub fn offline() -> Self {
        let source = Self::new(Vec::new(), Vec::new());
        source.script.lock().unwrap().connect_ok = false;
        source
    }

    pub fn queries(&self) -> Vec<PackageQuery> {
        self.script.lock().unwrap().queries.clone()
    }

    pub fn connects(&self) -> u32 {
        self.script.lock().unwrap().connects
    }
}

pub struct ScriptedCatalog {
    script: Arc<Mutex<Script>>,
}

impl Catalog for ScriptedCatalog {
    fn find_packages(&self, query: &PackageQuery) -> Result<Vec<PackageMatch>> {
        let mut script = self.script.lock().unwrap();
        script.queries.push(query.clone());
        Ok(match query.field {
            MatchField::Command => script.by_command.clone(),
            MatchField::Name => script.by_name.clone(),
        })
    }
}

impl CatalogSource for ScriptedSource {
    type Catalog = ScriptedCatalog;

    fn connect(&self) -> Connection<ScriptedCatalog> {
        let mut script = self.script.lock().unwrap();
        script.connects += 1;
        if script.connect_ok {
            Connection::ok(ScriptedCatalog {
                script: self.script.clone(),
            })
        } else {
            Connection::failed()
        }
    }
}

pub fn hit(id: &str, field: MatchField, mode: MatchMode, value: &str) -> PackageMatch {
    PackageMatch::new(
        Package::new(id, id),
        MatchCriteria::new(field, mode, value),
    )
}
