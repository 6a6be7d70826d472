use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use bdn_core::{AppConfig, Result};
use bdn_inference::NewsAssistant;
use bdn_scrapers::logging::init_logging;
use bdn_scrapers::{handle_command, ScraperArgs, ScraperManager};
use bdn_storage::{batch_date, format_display_date, ArticleArchive};
use bdn_web::AppState;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask questions about recent Bangladesh news", long_about = None)]
pub struct Cli {
    /// Vector store backend: local (default) or memory
    #[arg(long)]
    storage: Option<String>,
    /// Model provider: gemini (default), openai, deepseek, ollama or dummy
    #[arg(long)]
    model: Option<String>,
    /// Base URL of the model API
    #[arg(long)]
    model_url: Option<String>,
    /// Directory holding the dated article batches
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Directory holding the vector index
    #[arg(long)]
    index_dir: Option<PathBuf>,
    /// chromedriver endpoint
    #[arg(long)]
    webdriver_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape news; all sources unless a subcommand narrows it
    Scrape(ScraperArgs),
    /// Ask a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive question loop, `exit` quits
    Chat,
    /// Show the latest article batch
    Status,
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(storage) = &self.storage {
            config.storage.backend = storage.to_lowercase();
        }
        if let Some(model) = &self.model {
            config.model.provider = model.to_lowercase();
        }
        if let Some(url) = &self.model_url {
            config.model.base_url = Some(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
        if let Some(dir) = &self.index_dir {
            config.storage.index_dir = dir.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.scrape.webdriver_url = url.clone();
        }
        config.validate()
    }
}

async fn start_assistant(config: &AppConfig, manager: Arc<ScraperManager>) -> Result<Arc<NewsAssistant>> {
    let assistant = NewsAssistant::from_config(config, manager).await?;
    // A failed cold start is retried by the first question
    if let Err(e) = assistant.initialize().await {
        error!("❌ Could not index the latest batch: {}", e);
    }
    Ok(Arc::new(assistant))
}

async fn chat(assistant: &NewsAssistant) -> Result<()> {
    if !assistant.is_indexed().await {
        println!("No news data found. Scraping fresh news...");
        println!("{}", assistant.refresh().await?);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"Enter your question (or 'exit' to quit): ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Some(answer) = assistant.converse(question).await {
            println!("Question: {}", question);
            println!("Answer: {}", answer.answer);
            for source in &answer.sources {
                println!("  - {} ({}) {}", source.title, source.source, source.url);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    cli.apply_overrides(&mut config)?;

    let archive = ArticleArchive::new(config.storage.data_dir.clone());
    let manager = Arc::new(ScraperManager::with_webdriver(archive, config.scrape.clone()));

    match cli.command {
        Commands::Scrape(args) => handle_command(args, &manager).await?,
        Commands::Ask { question } => {
            let assistant = start_assistant(&config, manager).await?;
            let answer = assistant.query(&question.join(" ")).await;
            println!("{}", answer.answer);
            for source in &answer.sources {
                println!("  - {} ({}) {}", source.title, source.source, source.url);
            }
        }
        Commands::Chat => {
            let assistant = start_assistant(&config, manager).await?;
            chat(&assistant).await?;
        }
        Commands::Status => match manager.archive().find_latest_news_file().await? {
            Some(file) => match batch_date(&file) {
                Some(date) => println!(
                    "📅 News last updated: {} ({})",
                    format_display_date(date),
                    file.display()
                ),
                None => println!("⚠️ Could not parse news date of {}", file.display()),
            },
            None => println!("No news data available. Run `bdn scrape` to get started."),
        },
        Commands::Serve { addr } => {
            let assistant = start_assistant(&config, manager).await?;
            info!("📰 Bangladesh News Assistant ready");
            bdn_web::serve(AppState::new(assistant), addr).await?;
        }
    }

    Ok(())
}
