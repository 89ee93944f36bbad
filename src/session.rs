//! 宿主会话：从输入流逐行读取 JSON 事件，每个事件回写一行 JSON 应答
//!
//! ```text
//! -> {"event":"command_not_found","command_line":"got status","target":"got"}
//! <- {"feedback":["winget install --id Git.Git"]}
//! -> {"event":"predict"}
//! <- {"suggestions":["winget install --id Git.Git"]}
//! -> {"event":"command_line_accepted","history":["git status"]}
//! <- {"ok":true}
//! ```

use crate::catalog::CatalogSource;
use crate::provider::{
    CommandNotFoundProvider, CommandPredictor, ErrorRecord, FeedbackProvider,
    PredictorFeedbackKind, COMMAND_NOT_FOUND_ERROR,
};
use crate::resolver::CancelToken;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

fn default_error_id() -> String {
    COMMAND_NOT_FOUND_ERROR.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    CommandNotFound {
        #[serde(default)]
        command_line: String,
        #[serde(default)]
        target: Option<String>,
        #[serde(default = "default_error_id")]
        error_id: String,
    },
    Predict,
    CommandLineAccepted {
        #[serde(default)]
        history: Vec<String>,
    },
    SuggestionDisplayed {
        #[serde(default)]
        session: u32,
        #[serde(default)]
        count_or_index: i32,
    },
    SuggestionAccepted {
        #[serde(default)]
        session: u32,
        #[serde(default)]
        suggestion: String,
    },
    CommandLineExecuted {
        #[serde(default)]
        command_line: String,
        #[serde(default)]
        success: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HostReply {
    Feedback { feedback: Vec<String> },
    Suggestions { suggestions: Vec<String> },
    Ack { ok: bool },
    Error { error: String },
}

pub type SharedFeedbackProvider = Arc<dyn FeedbackProvider + Send + Sync>;
pub type SharedPredictor = Arc<dyn CommandPredictor + Send + Sync>;

/// 宿主侧的扩展注册表，按能力分别登记
#[derive(Default)]
pub struct Registry {
    feedback: Vec<SharedFeedbackProvider>,
    predictors: Vec<SharedPredictor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_feedback(&mut self, provider: SharedFeedbackProvider) {
        log::debug!("注册反馈提供者: {} ({})", provider.name(), provider.id());
        self.feedback.push(provider);
    }

    pub fn register_predictor(&mut self, predictor: SharedPredictor) {
        log::debug!("注册预测器: {} ({})", predictor.name(), predictor.id());
        self.predictors.push(predictor);
    }

    /// 按 id 同时注销两种能力
    pub fn unregister(&mut self, id: &str) {
        self.feedback.retain(|p| p.id() != id);
        self.predictors.retain(|p| p.id() != id);
    }

    pub fn feedback_providers(&self) -> &[SharedFeedbackProvider] {
        &self.feedback
    }

    pub fn predictors(&self) -> &[SharedPredictor] {
        &self.predictors
    }

    pub fn is_empty(&self) -> bool {
        self.feedback.is_empty() && self.predictors.is_empty()
    }
}

/// 把命令未找到提供者同时注册为反馈提供者和预测器；
/// 目录后端不可用时不注册，返回 false
pub fn register_command_not_found<S>(
    registry: &mut Registry,
    provider: Arc<CommandNotFoundProvider<S>>,
    available: bool,
) -> bool
where
    S: CatalogSource + Send + Sync + 'static,
{
    if !available {
        log::info!("包目录不可用，跳过注册");
        return false;
    }
    registry.register_feedback(provider.clone());
    registry.register_predictor(provider);
    true
}

pub struct Session {
    registry: Registry,
    cancel: CancelToken,
}

impl Session {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            cancel: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn notify(&self, kind: PredictorFeedbackKind, f: impl Fn(&SharedPredictor)) {
        self.registry
            .predictors()
            .iter()
            .filter(|p| p.can_accept_feedback(kind))
            .for_each(f);
    }

    /// 处理一个事件（可能阻塞在目录查询上）
    pub fn handle(&self, event: HostEvent) -> HostReply {
        match event {
            HostEvent::CommandNotFound {
                command_line,
                target,
                error_id,
            } => {
                let error = ErrorRecord { error_id, target };
                let feedback = self
                    .registry
                    .feedback_providers()
                    .iter()
                    .filter_map(|p| p.get_feedback(&command_line, &error, &self.cancel))
                    .flat_map(|item| item.actions)
                    .collect();
                HostReply::Feedback { feedback }
            }
            HostEvent::Predict => {
                let suggestions = self
                    .registry
                    .predictors()
                    .iter()
                    .flat_map(|p| p.get_suggestion(&self.cancel))
                    .collect();
                HostReply::Suggestions { suggestions }
            }
            HostEvent::CommandLineAccepted { history } => {
                self.notify(PredictorFeedbackKind::CommandLineAccepted, |p| {
                    p.on_command_line_accepted(&history)
                });
                HostReply::Ack { ok: true }
            }
            HostEvent::SuggestionDisplayed {
                session,
                count_or_index,
            } => {
                self.notify(PredictorFeedbackKind::SuggestionDisplayed, |p| {
                    p.on_suggestion_displayed(session, count_or_index)
                });
                HostReply::Ack { ok: true }
            }
            HostEvent::SuggestionAccepted {
                session,
                suggestion,
            } => {
                self.notify(PredictorFeedbackKind::SuggestionAccepted, |p| {
                    p.on_suggestion_accepted(session, &suggestion)
                });
                HostReply::Ack { ok: true }
            }
            HostEvent::CommandLineExecuted {
                command_line,
                success,
            } => {
                self.notify(PredictorFeedbackKind::CommandLineExecuted, |p| {
                    p.on_command_line_executed(&command_line, success)
                });
                HostReply::Ack { ok: true }
            }
        }
    }

    pub fn handle_line(&self, line: &str) -> HostReply {
        match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => self.handle(event),
            Err(e) => {
                log::warn!("无法解析事件 {:?}: {}", line, e);
                HostReply::Error {
                    error: format!("invalid event: {}", e),
                }
            }
        }
    }
}

/// 运行会话直到输入结束或收到 Ctrl+C
pub async fn serve<R, W>(session: Arc<Session>, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                log::info!("收到中断信号，结束会话");
                session.cancel_token().cancel();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let worker = session.clone();
        let task = tokio::task::spawn_blocking(move || worker.handle_line(&line));
        let reply = tokio::select! {
            reply = task => reply?,
            _ = tokio::signal::ctrl_c() => {
                // 正在进行的查询会在下一个查询边界处停止
                log::info!("收到中断信号，取消当前查询");
                session.cancel_token().cancel();
                break;
            }
        };

        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
