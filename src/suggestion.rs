//! 待处理的安装建议：同一时刻至多一条

use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionState {
    Empty,
    Holding(String),
}

/// 建议槽。写入方为反馈路径和“命令行已接受”路径，读取方为预测路径。
#[derive(Debug, Default)]
pub struct SuggestionSlot {
    inner: RwLock<Option<String>>,
}

impl SuggestionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入新建议，总是覆盖旧值
    pub fn set(&self, suggestion: String) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(suggestion);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn get(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn state(&self) -> SuggestionState {
        match self.get() {
            Some(s) => SuggestionState::Holding(s),
            None => SuggestionState::Empty,
        }
    }
}
