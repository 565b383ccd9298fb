//! Reposcope CLI - analyze your repositories and rank the resulting report
//!
//! `analyze` walks every repository through the analysis pipeline and writes
//! the Markdown report; `evaluate` reads a report back and rates each project.

use clap::{Parser, Subcommand};
use reposcope_analysis::{Acknowledge, AnalysisOrchestrator, CancellationSignal, SkipController};
use reposcope_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, ErrorContext,
    LoggingConfig, RepositoryFetcher, RepositorySource, ScopeConfig, ScopeError, ScopeResult,
};
use reposcope_llm::{LlmSummarizer, ProjectEvaluator, ScopeLlmClient, EVALUATION_MAX_TOKENS};
use reposcope_repo::{DirectoryFilter, GitHubFetcher, LocalFetcher, RepositorySelection};
use reposcope_report::{format_card, load_report, ReportAssembler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "reposcope")]
#[command(about = "Analyze your GitHub repositories and build a project portfolio report")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze repositories and write the Markdown report
    Analyze {
        /// Maximum number of repositories to analyze
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only analyze repositories with this name (repeatable)
        #[arg(short, long = "repo")]
        repos: Vec<String>,

        /// Analyze a local directory instead of GitHub (repeatable)
        #[arg(long)]
        local: Vec<PathBuf>,

        /// Use template summaries instead of the LLM
        #[arg(long)]
        no_llm: bool,

        /// Disable the skip key
        #[arg(long)]
        no_skip: bool,

        /// Report path (defaults to report.output_path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the raw analysis results as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Rate the projects of a generated report and show the best ones
    Evaluate {
        /// Report to read (defaults to report.output_path)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Number of top projects to display
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Skip evaluation and just display the projects
        #[arg(long)]
        no_evaluate: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

struct AnalyzeOptions {
    limit: Option<usize>,
    repos: Vec<String>,
    local: Vec<PathBuf>,
    no_llm: bool,
    no_skip: bool,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // tokens usually live in .env.local; a missing file is fine
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Reposcope CLI v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Analyze {
            limit,
            repos,
            local,
            no_llm,
            no_skip,
            output,
            json,
        } => {
            let options = AnalyzeOptions {
                limit,
                repos,
                local,
                no_llm,
                no_skip,
                output,
                json,
            };
            handle_analyze(options, config).await?;
        }
        Commands::Evaluate {
            file,
            top,
            no_evaluate,
        } => {
            handle_evaluate(file, top, no_evaluate, &config).await?;
        }
        Commands::Config {
            show,
            init,
            validate,
        } => {
            handle_config(show, init, validate, cli.config.as_ref(), &config)?;
        }
    }

    Ok(())
}

fn load_config(config_path: Option<&PathBuf>) -> ScopeResult<ScopeConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return ScopeConfig::from_file(path);
    }

    if let Some(path) = ScopeConfig::default_paths()
        .into_iter()
        .find(|path| path.exists())
    {
        info!("Loading configuration from {:?}", path);
        return ScopeConfig::from_file(path);
    }

    info!("No configuration file found, using defaults");
    Ok(ScopeConfig::default())
}

async fn handle_analyze(options: AnalyzeOptions, mut config: ScopeConfig) -> ScopeResult<()> {
    log_operation_start!("analyze");

    if options.limit.is_some() {
        config.repository.limit = options.limit;
    }
    if !options.repos.is_empty() {
        config.repository.allow_list = Some(options.repos);
    }
    if options.no_skip {
        config.skip.enabled = false;
    }
    config.validate()?;

    let filter = DirectoryFilter::new(config.repository.excluded_dirs.iter().cloned());
    let fetcher: Box<dyn RepositoryFetcher> = if options.local.is_empty() {
        let github = GitHubFetcher::from_config(&config.github, &config.repository).map_err(|e| {
            println!("❌ {}", e);
            log_operation_error!("analyze", e);
            e
        })?;
        Box::new(github)
    } else {
        Box::new(LocalFetcher::new(options.local.clone(), filter))
    };

    println!("🔍 Discovering repositories...");
    let mut sources = fetcher.fetch().await?;
    if !options.local.is_empty() {
        let selection = RepositorySelection::from_config(&config.repository);
        sources = selection.apply(sources, |source: &Box<dyn RepositorySource>| {
            let descriptor = source.descriptor();
            (descriptor.name.as_str(), descriptor.full_name.as_str())
        });
    }
    println!("📂 Found {} repositories to analyze", sources.len());

    let mut orchestrator = AnalysisOrchestrator::new(&config.analysis);
    if options.no_llm {
        println!("📝 LLM disabled, using template summaries");
    } else {
        match ScopeLlmClient::new(config.llm.clone()).await {
            Ok(client) => {
                println!("🤖 Summaries by {}/{}", config.llm.provider, config.llm.model);
                orchestrator =
                    orchestrator.with_summarizer(Arc::new(LlmSummarizer::new(Arc::new(client))));
            }
            Err(e) => {
                warn!(error = %e, "LLM unavailable, using template summaries");
                println!("⚠️  LLM unavailable ({}), using template summaries", e);
            }
        }
    }

    let acknowledge: Acknowledge =
        Arc::new(|| println!("⏭️  Skip requested, moving on to the next repository..."));
    let controller =
        SkipController::from_config(&config.skip, CancellationSignal::new(), Some(acknowledge));
    if controller.is_listening() {
        println!(
            "💡 Press '{}' then Enter to skip the repository being analyzed",
            config.skip.key
        );
    }

    let results = orchestrator.run(&sources, controller.signal()).await;
    controller.shutdown();

    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(&config.report.output_path));
    let assembler = ReportAssembler::new(config.report.clone());
    assembler.write_markdown(&results, &output).await?;
    if let Some(json_path) = &options.json {
        assembler.write_json(&results, json_path).await?;
        println!("🗂️  Raw results: {}", json_path.display());
    }

    let skipped: Vec<_> = results.iter().filter(|result| result.skipped).collect();
    println!(
        "\n✅ Analyzed {} repositories ({} skipped)",
        results.len(),
        skipped.len()
    );
    for result in &skipped {
        println!(
            "  ⏭️  {}: {}",
            result.name,
            result.note.as_deref().unwrap_or("skipped")
        );
    }
    println!("📄 Report generated: {}", output.display());

    log_operation_success!(
        "analyze",
        analyzed = results.len(),
        skipped = skipped.len()
    );
    Ok(())
}

async fn handle_evaluate(
    file: Option<PathBuf>,
    top: usize,
    no_evaluate: bool,
    config: &ScopeConfig,
) -> ScopeResult<()> {
    log_operation_start!("evaluate");

    let path = file.unwrap_or_else(|| PathBuf::from(&config.report.output_path));
    let cards = load_report(&path).await.map_err(|e| {
        println!("❌ Failed to load report: {}", e);
        e
    })?;

    if no_evaluate {
        println!("\n--- {} ({}) ---\n", config.report.title, cards.len());
        for card in &cards {
            println!("{}", format_card(card, None));
        }
        return Ok(());
    }

    let mut llm_config = config.llm.clone();
    llm_config.max_tokens = EVALUATION_MAX_TOKENS;
    let client = ScopeLlmClient::new(llm_config).await?;
    let evaluator = ProjectEvaluator::new(Arc::new(client));

    println!("🤖 Evaluating {} projects...", cards.len());
    let ranked = evaluator.rank(cards).await;

    let top_n = top.min(ranked.len());
    println!("\n--- Top {} Most Impressive Projects ---\n", top_n);
    for (card, evaluation) in ranked.iter().take(top_n) {
        println!("{}", format_card(card, Some(evaluation)));
    }

    log_operation_success!("evaluate", evaluated = ranked.len(), shown = top_n);
    Ok(())
}

fn handle_config(
    show: bool,
    init: bool,
    validate: bool,
    config_path: Option<&PathBuf>,
    config: &ScopeConfig,
) -> ScopeResult<()> {
    if init {
        let path = config_path
            .cloned()
            .or_else(|| ScopeConfig::default_paths().into_iter().next())
            .unwrap_or_else(|| PathBuf::from("reposcope.toml"));

        if path.exists() {
            println!("⚠️  Configuration already exists at: {:?}", path);
        } else {
            ScopeConfig::default().save_to_file(&path)?;
            println!("✅ Configuration initialized at: {:?}", path);
            println!("📝 Put GITHUB_TOKEN and OPENAI_API_KEY in .env.local or the environment.");
        }
    }

    if show {
        let mut shown = config.clone();
        if shown.github.token.is_some() {
            shown.github.token = Some("********".to_string());
        }
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("********".to_string());
        }
        let rendered = toml::to_string_pretty(&shown).map_err(|e| ScopeError::Config {
            message: format!("Failed to render configuration: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("cli").with_operation("config_show"),
        })?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "reposcope",
            "analyze",
            "--limit",
            "3",
            "--repo",
            "alpha",
            "--repo",
            "beta",
            "--no-llm",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze {
                limit,
                repos,
                local,
                no_llm,
                no_skip,
                ..
            } => {
                assert_eq!(limit, Some(3));
                assert_eq!(repos, vec!["alpha", "beta"]);
                assert!(local.is_empty());
                assert!(no_llm);
                assert!(!no_skip);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_evaluate_defaults() {
        let cli = Cli::try_parse_from(["reposcope", "evaluate"]).unwrap();
        match cli.command {
            Commands::Evaluate {
                file,
                top,
                no_evaluate,
            } => {
                assert!(file.is_none());
                assert_eq!(top, 10);
                assert!(!no_evaluate);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let missing = PathBuf::from("/nonexistent/reposcope/config.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ScopeError::Config { .. })
        ));
    }
}
