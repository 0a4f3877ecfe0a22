//! 本地管理命令行工具：
//! - 为指定 subject 签发 Bearer 令牌（用于调用评论提交接口）
//! - 在配置的 SQLite 路径上初始化表结构

use std::env;
use std::fmt::{Display, Formatter};

use catalog_backend::AppConfig;
use catalog_backend::features::auth::bearer::issue_access_token;
use catalog_backend::features::catalog::CatalogStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Token(TokenCmd),
    InitDb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenCmd {
    subject: String,
    ttl_secs: Option<u64>,
}

#[derive(Debug)]
enum CliError {
    Args(String),
    Config(String),
    Runtime(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Args(msg) => write!(f, "参数错误: {msg}"),
            CliError::Config(msg) => write!(f, "配置错误: {msg}"),
            CliError::Runtime(msg) => write!(f, "执行失败: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn print_help() {
    println!(
        "catalog_admin - 商品目录后端管理工具

用法:
  catalog_admin token --sub <subject> [--ttl <secs>]
      使用配置中的 auth.jwt_secret 签发访问令牌并输出到 stdout
  catalog_admin init-db
      在 database.sqlite_path 上创建表结构（已存在则跳过）
  catalog_admin help

配置:
  读取 APP_CONFIG_PATH（默认 config.toml），可被 APP_* 环境变量覆盖"
    );
}

fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    match name.as_str() {
        "token" => parse_token_cmd(rest).map(Command::Token),
        "init-db" => {
            if let Some(extra) = rest.first() {
                return Err(CliError::Args(format!("init-db 不接受参数: {extra}")));
            }
            Ok(Command::InitDb)
        }
        "help" | "-h" | "--help" => Ok(Command::Help),
        _ => Err(CliError::Args(format!("未知命令: {name}"))),
    }
}

fn parse_token_cmd(rest: &[String]) -> Result<TokenCmd, CliError> {
    let mut subject = None;
    let mut ttl_secs = None;

    let mut idx = 0usize;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--sub" => {
                idx += 1;
                subject = Some(
                    rest.get(idx)
                        .ok_or_else(|| CliError::Args("缺少 --sub 的值".to_string()))?
                        .to_string(),
                );
                idx += 1;
            }
            "--ttl" => {
                idx += 1;
                let raw = rest
                    .get(idx)
                    .ok_or_else(|| CliError::Args("缺少 --ttl 的值".to_string()))?;
                let ttl = raw
                    .parse::<u64>()
                    .map_err(|_| CliError::Args(format!("--ttl 需要正整数: {raw}")))?;
                if ttl == 0 {
                    return Err(CliError::Args("--ttl 必须大于 0".to_string()));
                }
                ttl_secs = Some(ttl);
                idx += 1;
            }
            other => return Err(CliError::Args(format!("token 不支持的参数: {other}"))),
        }
    }

    let subject = subject
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CliError::Args("token 需要 --sub <subject>".to_string()))?;
    Ok(TokenCmd { subject, ttl_secs })
}

async fn run(cmd: Command, config: &AppConfig) -> Result<(), CliError> {
    match cmd {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Token(cmd) => {
            let token = issue_access_token(&config.auth, &cmd.subject, cmd.ttl_secs)
                .map_err(|e| CliError::Runtime(e.to_string()))?;
            println!("{token}");
            Ok(())
        }
        Command::InitDb => {
            let storage = CatalogStorage::connect_sqlite(
                &config.database.sqlite_path,
                config.database.sqlite_wal,
            )
            .await
            .map_err(|e| CliError::Runtime(e.to_string()))?;
            storage
                .init_schema()
                .await
                .map_err(|e| CliError::Runtime(e.to_string()))?;
            storage.pool.close().await;
            eprintln!("schema ready: {}", config.database.sqlite_path);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cmd = parse_args(&args)?;
    if cmd == Command::Help {
        print_help();
        return Ok(());
    }

    let config = AppConfig::load().map_err(|e| CliError::Config(e.to_string()))?;
    run(cmd, &config).await?;
    Ok(())
}
