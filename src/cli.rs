use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use chainpost::chain::load_chain;
use chainpost::config::{Config, ConfigFile, ConfigLoader, RequestTemplate};
use chainpost::http::{Client, Method, ResolvedRequest, Response};
use chainpost::runner::{ChainReporter, ChainRunner, apply_to_config};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use inquire::{Confirm, Password, Text};
use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径（默认在当前目录及其父目录查找 chainpost.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 使用 <NAME>.toml 作为配置文件
    #[arg(long, global = true)]
    pub bundle: Option<String>,

    /// 输出详细信息
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a GET request
    Get(RequestArgs),
    /// Send a POST request
    Post(RequestArgs),
    /// Send a PUT request
    Put(RequestArgs),
    /// Send a PATCH request
    Patch(RequestArgs),
    /// Send a DELETE request
    Delete(RequestArgs),
    /// Send a HEAD request
    Head(RequestArgs),
    /// Send an OPTIONS request
    Options(RequestArgs),
    /// Run a saved chain, or a saved request when no chain has that name
    Run { name: String },
    /// Create a config file interactively
    Init,
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// 完整 URL 或相对 base_url 的路径
    pub url: String,

    /// 请求体，`@path` 表示从文件读取
    #[arg(short, long, default_value = "")]
    pub body: String,

    /// 请求头，例如 "Content-Type: application/json"
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// 不使用配置中的认证信息
    #[arg(long)]
    pub no_auth: bool,

    /// 不使用配置中的公共 headers
    #[arg(long)]
    pub no_headers: bool,

    /// 以该名称保存请求
    #[arg(long)]
    pub save: Option<String>,

    /// 从响应中提取 cookie 写入 auth.cookie
    #[arg(long)]
    pub extract_cookie: Option<String>,

    /// 把响应中的 JSON 字段写入配置（key=jsonpath）
    #[arg(long = "extract-to-config", value_parser = parse_key_value)]
    pub extract_to_config: Vec<(String, String)>,
}

impl RequestArgs {
    fn into_template(self, method: Method) -> (RequestTemplate, Option<String>) {
        let template = RequestTemplate {
            method: method.to_string(),
            url: self.url,
            body: self.body,
            headers: self.headers,
            no_auth: self.no_auth,
            no_headers: self.no_headers,
            extract_cookie: self.extract_cookie,
            extract_to_config: self.extract_to_config.into_iter().collect::<BTreeMap<_, _>>(),
        };
        (template, self.save)
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=jsonpath, got '{}'", s)),
    }
}

pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let reporter = ChainReporter::new(cli.verbose);
    let bundle = cli.bundle.as_deref();
    let explicit = cli.config.as_deref();

    let (method, args) = match cli.command {
        Commands::Init => return run_init(explicit, bundle),
        Commands::Run { name } => {
            let file = ConfigLoader::load(explicit, bundle)?;
            return run_saved(file, &name, reporter, cancel).await;
        }
        Commands::Get(args) => (Method::Get, args),
        Commands::Post(args) => (Method::Post, args),
        Commands::Put(args) => (Method::Put, args),
        Commands::Patch(args) => (Method::Patch, args),
        Commands::Delete(args) => (Method::Delete, args),
        Commands::Head(args) => (Method::Head, args),
        Commands::Options(args) => (Method::Options, args),
    };

    let mut file = ConfigLoader::load(explicit, bundle)?;
    let (template, save_name) = args.into_template(method);

    if let Some(name) = save_name {
        file.config.save_request(name.clone(), template.clone());
        file.save()
            .with_context(|| format!("failed to save request '{}'", name))?;
        eprintln!("Request saved as '{}' to {}", name, file.path.display());
    }

    let name = template.url.clone();
    run_single(&mut file, &name, &template, &reporter, cancel).await
}

/// `run <name>`：同名链优先，否则执行已保存的请求
async fn run_saved(
    mut file: ConfigFile,
    name: &str,
    reporter: ChainReporter,
    cancel: CancellationToken,
) -> Result<()> {
    if file.config.has_chain(name) {
        let chain = load_chain(&file.config, name)?;
        let client = Client::with_timeout_secs(file.config.timeout_secs)?;

        reporter.print_header(&chain.name, chain.step_count());
        let summary = ChainReporter::new(false);
        let report = ChainRunner::new(&file.config, &client)
            .with_cancellation(cancel)
            .with_observer(reporter)
            .run_chain(&chain)
            .await?;
        summary.print_summary(&report);
        return Ok(());
    }

    let template = file.config.request(name)?.clone();
    run_single(&mut file, name, &template, &reporter, cancel).await
}

/// 执行单个请求，并把 extract_cookie / extract_to_config 的结果写回配置
async fn run_single(
    file: &mut ConfigFile,
    name: &str,
    template: &RequestTemplate,
    reporter: &ChainReporter,
    cancel: CancellationToken,
) -> Result<()> {
    let (request, response) = send(&file.config, name, template, cancel).await?;
    reporter.print_response(&request, &response);

    if apply_to_config(template, &response, &mut file.config) {
        file.save()
            .with_context(|| format!("failed to update {}", file.path.display()))?;
    }
    Ok(())
}

async fn send(
    config: &Config,
    name: &str,
    template: &RequestTemplate,
    cancel: CancellationToken,
) -> Result<(ResolvedRequest, Response)> {
    let client = Client::with_timeout_secs(config.timeout_secs)?;
    let result = ChainRunner::new(config, &client)
        .with_cancellation(cancel)
        .run_template(name, template)
        .await?;
    Ok(result)
}

/// 交互式初始化向导得到的配置
#[derive(Debug, Default)]
struct InitAnswers {
    base_url: String,
    credentials: Option<(String, String)>,
    headers: Vec<(String, String)>,
}

impl InitAnswers {
    fn apply(self, config: &mut Config) {
        if !self.base_url.is_empty() {
            config.base_url = Some(self.base_url);
        }
        if let Some((username, password)) = self.credentials {
            config.auth.username = Some(username);
            config.auth.password = Some(password);
        }
        config.headers.extend(self.headers);
    }
}

fn prompt_init() -> Result<InitAnswers> {
    let mut answers = InitAnswers {
        base_url: Text::new("Base URL:").prompt()?.trim().to_string(),
        ..InitAnswers::default()
    };

    if Confirm::new("Configure Basic Authentication?")
        .with_default(false)
        .prompt()?
    {
        let username = Text::new("Username:").prompt()?;
        let password = Password::new("Password:")
            .without_confirmation()
            .with_help_message("Use ${ENV_NAME} to read it from the environment")
            .prompt()?;
        answers.credentials = Some((username.trim().to_string(), password));
    }

    if Confirm::new("Configure common headers?")
        .with_default(false)
        .prompt()?
    {
        loop {
            let name = Text::new("Header Name (leave empty to finish):").prompt()?;
            let name = name.trim();
            if name.is_empty() {
                break;
            }
            let value = Text::new("Header Value:").prompt()?;
            answers.headers.push((name.to_string(), value.trim().to_string()));
        }
    }

    Ok(answers)
}

fn run_init(explicit: Option<&std::path::Path>, bundle: Option<&str>) -> Result<()> {
    let path = explicit
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(ConfigLoader::file_name(bundle)));

    let mut config = if path.is_file() {
        ConfigLoader::load_from_path(&path)?
    } else {
        Config::default()
    };

    println!("Initializing new chainpost bundle...");
    prompt_init()?.apply(&mut config);

    ConfigLoader::save_to_path(&config, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "{} Configuration saved to {}",
        "Bundle initialized!".green(),
        path.display()
    );
    Ok(())
}
