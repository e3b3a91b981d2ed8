//! CLI command definitions for codeweaver.
//!
//! `generate` runs one task, `interactive` reads tasks from stdin, and
//! `extract` runs the response extractor over saved model output.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, warn};

use crate::agents::{AgentConfig, CodingAgent, CodingTask};
use crate::llm::{build_provider, LlmProvider, ProviderConfig, ProviderKind};
use crate::output::{write_code, DEFAULT_OUTPUT_DIR};
use crate::utils::code_extraction::{extract_code_with, ExtractorConfig, DEFAULT_CODE_MARKER};

const RULE: &str = "----------------------------------------";

/// Generate code from natural-language task descriptions with a hosted LLM.
#[derive(Parser)]
#[command(name = "codeweaver")]
#[command(about = "Generate code from a task description using a hosted LLM")]
#[command(version)]
#[command(
    long_about = "codeweaver sends a coding task to a chat-completion API (OpenAI or DeepSeek), \
cleans the reply down to the code, and saves it.\n\nExample usage:\n  \
codeweaver generate \"Write a function that adds two numbers\" --provider deepseek"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate code for a single task.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Read tasks from stdin, one per line, and generate code for each.
    Interactive(InteractiveArgs),

    /// Extract the code payload from raw model output.
    Extract(ExtractArgs),
}

/// Provider selection and generation parameters shared by commands that call a model.
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Completion provider: openai or deepseek.
    #[arg(short = 'p', long, env = "CODEWEAVER_PROVIDER", default_value = "deepseek")]
    pub provider: ProviderKind,

    /// Model identifier (defaults to the provider's default model).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// API key (defaults to OPENAI_API_KEY or DEEPSEEK_API_KEY, per provider).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Override the provider's API base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Sampling temperature.
    #[arg(long, default_value = "0.7")]
    pub temperature: f64,

    /// Maximum number of tokens to generate.
    #[arg(long, default_value = "1000")]
    pub max_tokens: u32,

    /// Request timeout in seconds. No timeout unless set.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Accept replies without a code marker or code keyword as-is.
    #[arg(long)]
    pub allow_plain_text: bool,
}

/// Arguments for `codeweaver generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Natural-language description of the code to write.
    pub task: String,

    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Target language (defaults to python).
    #[arg(short = 'L', long)]
    pub language: Option<String>,

    /// Requirement the code must satisfy (repeatable).
    #[arg(short = 'r', long = "requirement")]
    pub requirements: Vec<String>,

    /// Behaviour the tests should cover (repeatable).
    #[arg(short = 't', long = "test-requirement")]
    pub test_requirements: Vec<String>,

    /// Directory generated files are written to.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Print the code without writing a file.
    #[arg(long)]
    pub no_save: bool,

    /// Output JSON summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `codeweaver interactive`.
#[derive(Args, Debug)]
pub struct InteractiveArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Target language for every task (defaults to python).
    #[arg(short = 'L', long)]
    pub language: Option<String>,

    /// Directory generated files are written to.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Print the code without writing files.
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for `codeweaver extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File with raw model output. Reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Literal token preceding the code block.
    #[arg(long, default_value = DEFAULT_CODE_MARKER)]
    pub marker: String,

    /// Accept text without a marker or code keyword as-is.
    #[arg(long)]
    pub allow_plain_text: bool,

    /// Keep Markdown code fences in the output.
    #[arg(long)]
    pub keep_fences: bool,
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    task: String,
    provider: String,
    code: String,
    used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

/// Parse command-line arguments into a [`Cli`].
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate_command(args).await,
        Commands::Interactive(args) => run_interactive_command(args).await,
        Commands::Extract(args) => run_extract_command(args).await,
    }
}

// ============================================================================
// Provider and agent construction
// ============================================================================

/// Resolve provider settings from flags and environment.
///
/// An explicit `--api-key` wins over the provider's environment variable;
/// the other `*_BASE_URL`/`*_MODEL` variables still apply unless a flag
/// overrides them.
fn resolve_provider_config(args: &ProviderArgs) -> anyhow::Result<ProviderConfig> {
    let kind = args.provider;
    let explicit_key = args.api_key.clone();

    let mut config = ProviderConfig::from_lookup(kind, |name| {
        if name == kind.api_key_var() {
            if let Some(key) = explicit_key.clone() {
                return Some(key);
            }
        }
        std::env::var(name).ok()
    })
    .with_context(|| {
        format!(
            "Failed to configure the {} provider. Pass --api-key or set {}.",
            kind,
            kind.api_key_var()
        )
    })?;

    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn build_llm_client(args: &ProviderArgs) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let config = resolve_provider_config(args)?;
    info!(provider = %config.kind, model = %config.model, "Using completion provider");
    Ok(build_provider(&config)?)
}

fn build_agent(args: &ProviderArgs) -> anyhow::Result<CodingAgent> {
    let llm_client = build_llm_client(args)?;
    let extractor = ExtractorConfig::default().with_require_code_token(!args.allow_plain_text);
    let config = AgentConfig::new()
        .with_temperature(args.temperature)
        .with_max_tokens(args.max_tokens)
        .with_extractor(extractor);
    Ok(CodingAgent::new(llm_client, config))
}

/// Run the agent, converting any failure into the fallback and its reason.
async fn generate_or_fallback(agent: &CodingAgent, task: &CodingTask) -> (String, Option<String>) {
    match agent.try_generate(task).await {
        Ok(code) => (code, None),
        Err(e) => {
            warn!(error = %e, "Code generation failed, using fallback");
            (agent.config().fallback.clone(), Some(e.to_string()))
        }
    }
}

// ============================================================================
// Command implementations
// ============================================================================

async fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let agent = build_agent(&args.provider)?;

    let mut task = CodingTask::new(args.task.clone());
    if let Some(language) = &args.language {
        task = task.with_language(language.clone());
    }
    task.requirements = args.requirements.clone();
    task.test_requirements = args.test_requirements.clone();

    if !args.json {
        println!("\nGenerating code for: {}", task.description);
        println!("{}", RULE);
    }

    let (code, fallback_reason) = generate_or_fallback(&agent, &task).await;

    let saved_to = if args.no_save || task.is_blank() {
        None
    } else {
        let path = write_code(&args.output_dir, &task, &code)
            .await
            .with_context(|| format!("Failed to save code to {}", args.output_dir.display()))?;
        Some(path.display().to_string())
    };

    if args.json {
        let output = GenerateOutput {
            task: task.description,
            provider: args.provider.provider.to_string(),
            used_fallback: fallback_reason.is_some(),
            fallback_reason,
            code,
            saved_to,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", code);
    println!("{}", RULE);
    if let Some(reason) = &fallback_reason {
        println!("Returned fallback code: {}", reason);
    }
    if let Some(path) = &saved_to {
        println!("Saved to: {}", path);
    }
    Ok(())
}

async fn run_interactive_command(args: InteractiveArgs) -> anyhow::Result<()> {
    let agent = build_agent(&args.provider)?;

    println!("codeweaver interactive session ({})", args.provider.provider);
    println!("Enter a task per line; 'exit' or Ctrl-D to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\ntask> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let description = line.trim();
        if description.is_empty() {
            continue;
        }
        if matches!(description, "exit" | "quit") {
            break;
        }

        let mut task = CodingTask::new(description);
        if let Some(language) = &args.language {
            task = task.with_language(language.clone());
        }

        let (code, fallback_reason) = generate_or_fallback(&agent, &task).await;

        println!("{}", RULE);
        println!("{}", code);
        println!("{}", RULE);
        if let Some(reason) = fallback_reason {
            println!("Returned fallback code: {}", reason);
        }

        if !args.no_save {
            match write_code(&args.output_dir, &task, &code).await {
                Ok(path) => println!("Saved to: {}", path.display()),
                Err(e) => warn!(error = %e, "Failed to save generated code"),
            }
        }
    }

    Ok(())
}

async fn run_extract_command(args: ExtractArgs) -> anyhow::Result<()> {
    let raw = match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            buf
        }
    };

    let config = ExtractorConfig::default()
        .with_marker(args.marker)
        .with_require_code_token(!args.allow_plain_text)
        .with_unwrap_fences(!args.keep_fences);

    let code = extract_code_with(&raw, &config).context("No code found")?;
    println!("{}", code);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_args() {
        let cli = Cli::try_parse_from([
            "codeweaver",
            "generate",
            "Write a function that adds two numbers",
            "--provider",
            "openai",
            "-r",
            "Take two integers",
            "-t",
            "Negative numbers",
            "--no-save",
        ])
        .expect("arguments should parse");

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.task, "Write a function that adds two numbers");
        assert_eq!(args.provider.provider, ProviderKind::OpenAi);
        assert_eq!(args.requirements, vec!["Take two integers".to_string()]);
        assert_eq!(args.test_requirements, vec!["Negative numbers".to_string()]);
        assert!(args.no_save);
        assert_eq!(args.provider.temperature, 0.7);
        assert_eq!(args.provider.max_tokens, 1000);
        assert!(args.provider.timeout_secs.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Cli::try_parse_from(["codeweaver", "generate", "x", "--provider", "camel"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_key_and_overrides() {
        let args = ProviderArgs {
            provider: ProviderKind::DeepSeek,
            model: Some("deepseek-coder".to_string()),
            api_key: Some("cli-key".to_string()),
            base_url: Some("http://localhost:9999/v1".to_string()),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: Some(30),
            allow_plain_text: false,
        };

        let config = resolve_provider_config(&args).expect("explicit key is enough");
        assert_eq!(config.api_key, "cli-key");
        assert_eq!(config.model, "deepseek-coder");
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_extract_args() {
        let cli = Cli::try_parse_from(["codeweaver", "extract", "reply.txt", "--allow-plain-text"])
            .expect("arguments should parse");

        let Commands::Extract(args) = cli.command else {
            panic!("expected extract command");
        };
        assert_eq!(args.input, Some(PathBuf::from("reply.txt")));
        assert_eq!(args.marker, DEFAULT_CODE_MARKER);
        assert!(args.allow_plain_text);
    }
}
