//! 宿主 shell 的扩展接口（反馈提供者 / 预测器）及 winget 命令未找到提供者

use crate::catalog::CatalogSource;
use crate::resolver::{CancelToken, Resolver};
use crate::suggestion::{SuggestionSlot, SuggestionState};

pub const PROVIDER_ID: &str = "e5351aa4-dfde-4d4d-bf0f-1a2f5a37d8d6";
pub const PROVIDER_NAME: &str = "Windows Package Manager - WinGet";
pub const PROVIDER_DESCRIPTION: &str = "Finds missing commands that can be installed via WinGet.";

/// 只有这种错误才会触发反馈
pub const COMMAND_NOT_FOUND_ERROR: &str = "CommandNotFoundException";

pub const DEFAULT_INSTALL_PREFIX: &str = "winget install --id";

/// 宿主上一条命令的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub error_id: String,
    /// 出错的对象；命令未找到时为未解析的命令名
    pub target: Option<String>,
}

impl ErrorRecord {
    pub fn command_not_found(target: impl Into<String>) -> Self {
        Self {
            error_id: COMMAND_NOT_FOUND_ERROR.to_string(),
            target: Some(target.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItem {
    pub header: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorFeedbackKind {
    SuggestionDisplayed,
    SuggestionAccepted,
    CommandLineAccepted,
    CommandLineExecuted,
}

pub trait Subsystem {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

pub trait FeedbackProvider: Subsystem {
    fn get_feedback(
        &self,
        command_line: &str,
        last_error: &ErrorRecord,
        cancel: &CancelToken,
    ) -> Option<FeedbackItem>;
}

pub trait CommandPredictor: Subsystem {
    fn can_accept_feedback(&self, kind: PredictorFeedbackKind) -> bool;

    fn get_suggestion(&self, cancel: &CancelToken) -> Vec<String>;

    fn on_command_line_accepted(&self, history: &[String]);

    fn on_suggestion_displayed(&self, _session: u32, _count_or_index: i32) {}

    fn on_suggestion_accepted(&self, _session: u32, _accepted: &str) {}

    fn on_command_line_executed(&self, _command_line: &str, _success: bool) {}
}

/// 命令未找到时从 winget 目录中查找可安装的包
pub struct CommandNotFoundProvider<S> {
    resolver: Resolver<S>,
    slot: SuggestionSlot,
    install_prefix: String,
}

impl<S: CatalogSource> CommandNotFoundProvider<S> {
    pub fn new(resolver: Resolver<S>) -> Self {
        Self::with_install_prefix(resolver, DEFAULT_INSTALL_PREFIX)
    }

    pub fn with_install_prefix(resolver: Resolver<S>, prefix: impl Into<String>) -> Self {
        Self {
            resolver,
            slot: SuggestionSlot::new(),
            install_prefix: prefix.into(),
        }
    }

    pub fn state(&self) -> SuggestionState {
        self.slot.state()
    }

    /// 解析命令名并更新建议槽：找到包时写入安装命令，否则清空
    pub fn suggest(&self, query: &str, cancel: &CancelToken) -> Option<String> {
        match self.resolver.resolve(query, cancel) {
            Some(package) => {
                let suggestion = package.install_command(&self.install_prefix);
                log::info!("{} -> {}", query, suggestion);
                self.slot.set(suggestion.clone());
                Some(suggestion)
            }
            None => {
                self.slot.clear();
                None
            }
        }
    }
}

impl<S> Subsystem for CommandNotFoundProvider<S> {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        PROVIDER_DESCRIPTION
    }
}

impl<S: CatalogSource> FeedbackProvider for CommandNotFoundProvider<S> {
    fn get_feedback(
        &self,
        command_line: &str,
        last_error: &ErrorRecord,
        cancel: &CancelToken,
    ) -> Option<FeedbackItem> {
        if last_error.error_id != COMMAND_NOT_FOUND_ERROR {
            return None;
        }
        // 宿主没有给出目标对象时，退回到命令行的第一个词
        let target = match &last_error.target {
            Some(t) => t.as_str(),
            None => command_line.split_whitespace().next()?,
        };
        let suggestion = self.suggest(target, cancel)?;
        Some(FeedbackItem {
            header: self.name().to_string(),
            actions: vec![suggestion],
        })
    }
}

impl<S: CatalogSource> CommandPredictor for CommandNotFoundProvider<S> {
    fn can_accept_feedback(&self, kind: PredictorFeedbackKind) -> bool {
        kind == PredictorFeedbackKind::CommandLineAccepted
    }

    fn get_suggestion(&self, _cancel: &CancelToken) -> Vec<String> {
        self.slot.get().into_iter().collect()
    }

    fn on_command_line_accepted(&self, _history: &[String]) {
        self.slot.clear();
    }
}
