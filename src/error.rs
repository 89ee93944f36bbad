use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("无法解析包索引 {path}: {source}")]
    IndexParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{program} 执行失败 (exit={code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("目录未连接")]
    NotConnected,

    #[error("操作已取消")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
