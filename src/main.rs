use anyhow::Result;
use clap::Parser;
use lian_cnf::catalog::Backend;
use lian_cnf::cli::{Cli, Commands};
use lian_cnf::config::{BackendKind, Config};
use lian_cnf::provider::CommandNotFoundProvider;
use lian_cnf::resolver::{CancelToken, Resolver};
use lian_cnf::session::{register_command_not_found, serve, Registry, Session};
use std::sync::Arc;
use tokio::io::BufReader;

fn build_provider(config: &Config) -> CommandNotFoundProvider<Backend> {
    let resolver = Resolver::with_retry(config.backend(), config.retry_policy());
    CommandNotFoundProvider::with_install_prefix(resolver, &config.install_prefix)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // 命令行参数优先于配置文件
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(index) = cli.index {
        config.index_path = index;
        config.backend = BackendKind::Index;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    match cli.command {
        Commands::Resolve { command } => {
            let provider = build_provider(&config);
            let suggestion =
                tokio::task::spawn_blocking(move || provider.suggest(&command, &CancelToken::new()))
                    .await?;
            match suggestion {
                Some(s) => println!("{}", s),
                None => std::process::exit(1),
            }
        }
        Commands::Serve => {
            let available = config.backend().is_available();
            let provider = Arc::new(build_provider(&config));

            let mut registry = Registry::new();
            register_command_not_found(&mut registry, provider, available);

            let session = Arc::new(Session::new(registry));
            serve(session, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
        }
        Commands::Hook { shell } => {
            print!("{}", shell.hook_script());
        }
    }

    Ok(())
}
