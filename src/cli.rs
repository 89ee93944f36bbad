use crate::config::BackendKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lian-cnf: 命令未找到时推荐可通过 winget 安装的包
#[derive(Parser, Debug)]
#[command(name = "lian-cnf", version, about)]
pub struct Cli {
    /// 配置文件路径（默认 ~/.config/lian-cnf/config.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆盖配置中的目录后端
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    /// 覆盖配置中的本地索引路径
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 解析一个未找到的命令并打印安装建议
    Resolve {
        /// 用户输入的命令名
        command: String,
    },

    /// 以 JSON Lines 协议与宿主 shell 交互
    Serve,

    /// 打印接入 shell 的 command_not_found 钩子
    Hook {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
}

impl Shell {
    pub fn hook_script(&self) -> &'static str {
        match self {
            Shell::Bash => {
                r#"command_not_found_handle() {
    local suggestion
    if suggestion="$(lian-cnf resolve "$1" 2>/dev/null)"; then
        printf '%s: command not found\nTry: %s\n' "$1" "$suggestion" >&2
    else
        printf '%s: command not found\n' "$1" >&2
    fi
    return 127
}
"#
            }
            Shell::Zsh => {
                r#"command_not_found_handler() {
    local suggestion
    if suggestion="$(lian-cnf resolve "$1" 2>/dev/null)"; then
        print -u2 "$1: command not found"
        print -u2 "Try: $suggestion"
    else
        print -u2 "$1: command not found"
    fi
    return 127
}
"#
            }
        }
    }
}
