use legal_mitra::assistant::{
    AskRequest, AskResponse, HealthReport, HealthStatus, LegalAssistant, RetrieveRequest,
};
use legal_mitra::cli::{Cli, Commands, ConfigAction};
use legal_mitra::config::{Config, ConfigValidator};
use legal_mitra::embedding::FastEmbedProvider;
use legal_mitra::error::{MitraError, Result};
use legal_mitra::index::PineconeIndex;
use legal_mitra::intent::QueryIntentAnalyzer;
use legal_mitra::llm::GeminiClient;
use legal_mitra::patterns::PatternRegistry;
use legal_mitra::retrieval::{RetrievalService, RetrievalSettings};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

type Assistant = LegalAssistant<PineconeIndex, GeminiClient>;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Ask {
            question,
            top_k,
            namespaces,
            no_sources,
            json,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            let request = AskRequest {
                question,
                top_k,
                namespaces: non_empty(namespaces),
                include_sources: !no_sources,
            };
            run(async {
                let assistant = build_assistant(&config).await?;
                let response = assistant.ask(request).await?;
                if json {
                    print_json(&response)?;
                } else {
                    print_answer(&response);
                }
                Ok(())
            })?;
        }
        Commands::Retrieve {
            question,
            top_k,
            namespaces,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            let request = RetrieveRequest {
                question,
                top_k,
                namespaces: non_empty(namespaces),
            };
            run(async {
                let assistant = build_assistant(&config).await?;
                let response = assistant.retrieve_only(request).await?;
                print_json(&response)
            })?;
        }
        Commands::Namespaces { json } => {
            let config = load_config(cli.config, cli.profile)?;
            run(async {
                let assistant = build_assistant(&config).await?;
                let report = assistant.namespaces().await;
                if json {
                    return print_json(&report);
                }
                println!("Namespaces: {} total", report.total_namespaces);
                for namespace in &report.namespaces {
                    match report.details.get(namespace) {
                        Some(stats) => println!("  {} ({} vectors)", namespace, stats.vector_count),
                        None => println!("  {}", namespace),
                    }
                }
                Ok(())
            })?;
        }
        Commands::Health => {
            let config = load_config(cli.config, cli.profile)?;
            let report = run(async {
                match build_assistant(&config).await {
                    Ok(assistant) => Ok(assistant.health().await),
                    Err(e) => {
                        tracing::warn!("Assistant setup failed: {}", e);
                        Ok(HealthReport::unhealthy(
                            config.embedding.model.as_str(),
                            config.llm.model.as_str(),
                            e,
                        ))
                    }
                }
            })?;
            print_json(&report)?;
            if report.status == HealthStatus::Unhealthy {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "legal_mitra=debug"
    } else {
        "legal_mitra=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run<T, F: std::future::Future<Output = Result<T>>>(future: F) -> Result<T> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| MitraError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    rt.block_on(future)
}

async fn build_assistant(config: &Config) -> Result<Assistant> {
    ConfigValidator::validate_credentials(config)?;

    let patterns = match &config.patterns.intent_file {
        Some(path) => PatternRegistry::from_config_file(&expand_path(path)?)?,
        None => PatternRegistry::builtin()?,
    };
    let analyzer = QueryIntentAnalyzer::new(Arc::new(patterns));

    let index = PineconeIndex::connect(&config.index).await?;
    let retrieval =
        RetrievalService::new(index, analyzer, RetrievalSettings::from(&config.retrieval));

    let embedder = Arc::new(FastEmbedProvider::from_config(&config.embedding)?);
    let generator = GeminiClient::from_config(&config.llm)?;

    tracing::info!("Legal Mitra ready");

    Ok(LegalAssistant::new(
        embedder,
        retrieval,
        generator,
        config.retrieval.clone(),
        config.query.clone(),
    ))
}

fn print_answer(response: &AskResponse) {
    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!("\nSources:");
        for (idx, source) in response.sources.iter().enumerate() {
            println!(
                "  [{}] {} - Section {} ({}, score {:.3})",
                idx + 1,
                source.act_name,
                source.section_number,
                source.namespace,
                source.score
            );
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| MitraError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })?;
    println!("{}", json);
    Ok(())
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, profile)?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Index: {}", config.index.name);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| MitraError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
        ConfigAction::Path => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'legal-mitra config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        if let Some(profile) = profile {
            return Err(MitraError::Config(format!(
                "Profile '{}' requested but no config file exists",
                profile
            )));
        }
        return Ok(config);
    }

    match profile {
        Some(profile) => Config::load_with_profile(&path, &profile),
        None => Config::load(&path),
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| MitraError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| MitraError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
