use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tistory_runner::{
    auth, ArticleFile, BatchRunner, GeminiClient, LogProgress, NaverSearchClient,
    PublishSchedule, RunnerConfig, Session, Settings,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "tistory-runner")]
#[command(about = "Batch-publish generated articles through the Tistory editor")]
#[command(version)]
struct Cli {
    /// Runner config file (selector profile, waits, browser)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish article files (or every .txt in a directory)
    Publish {
        /// Article files or directories of article files
        paths: Vec<PathBuf>,

        /// Scheduled publish date (YYYY-MM-DD); omit to publish now
        #[arg(long)]
        date: Option<String>,

        /// Scheduled hour, clamped to 0-23
        #[arg(long, default_value_t = 9)]
        hour: i64,

        /// Scheduled minute, clamped to 0-59
        #[arg(long, default_value_t = 0)]
        minute: i64,

        /// Run the browser headless (login must already be cached)
        #[arg(long)]
        headless: bool,
    },

    /// Generate article files from a search keyword
    Generate {
        /// Search keyword to analyze
        keyword: String,

        /// Number of articles to generate
        #[arg(long, default_value_t = 3)]
        count: usize,

        /// Output directory (defaults to DEFAULT_SAVE_PATH, then ".")
        #[arg(long)]
        out: Option<PathBuf>,

        /// Extra generation instructions appended to every article prompt
        #[arg(long, default_value = "독자에게 도움이 되는 실용적인 글을 작성해주세요.")]
        prompt: String,
    },

    /// Validate a runner config without launching anything
    Check,
}

#[tokio::main]
async fn main() -> tistory_runner::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };

    match cli.command {
        Command::Publish {
            paths,
            date,
            hour,
            minute,
            headless,
        } => publish(config, paths, date, hour, minute, headless).await,
        Command::Generate {
            keyword,
            count,
            out,
            prompt,
        } => generate(keyword, count, out, &prompt).await,
        Command::Check => {
            println!("Config valid");
            println!("  WebDriver: {}", config.browser.webdriver_url);
            println!("  Write button: {}", config.selectors.write_button);
            println!("  Title input: {}", config.selectors.title_input);
            println!("  Publish button: {}", config.selectors.publish_button);
            println!(
                "  Waits: element {}s, window {}s, alert {}s x{}",
                config.waits.element_secs,
                config.waits.window_secs,
                config.waits.alert_secs,
                config.waits.alert_retries
            );
            Ok(())
        }
    }
}

async fn publish(
    mut config: RunnerConfig,
    paths: Vec<PathBuf>,
    date: Option<String>,
    hour: i64,
    minute: i64,
    headless: bool,
) -> tistory_runner::Result<()> {
    // schedule validation happens before any browser work
    let schedule = match date {
        Some(date) => Some(PublishSchedule::new(&date, hour, minute)?),
        None => None,
    };

    let files = collect_article_files(&paths)?;
    if files.is_empty() {
        println!("No article files to publish.");
        return Ok(());
    }

    if headless {
        config.browser.headless = true;
    }

    let session = Session::provision(&config.browser, &config.waits).await?;
    auth::open_login_entry(&session).await?;

    println!("Log in to Tistory in the browser window, then press Enter to start.");
    wait_for_enter();

    println!("Publishing {} article(s)...", files.len());
    let runner = BatchRunner::new(&session, &config.selectors);
    let run = runner.run(&files, schedule.as_ref(), &LogProgress).await;

    println!();
    for item in &run.items {
        match &item.outcome {
            tistory_runner::Outcome::Published => println!("✓ {} - published", item.title),
            tistory_runner::Outcome::PreparedManualFallback => {
                println!("◌ {} - prepared, publish manually", item.title)
            }
            tistory_runner::Outcome::Failed(reason) => {
                println!("✗ {} - {}", item.title, reason)
            }
        }
    }
    println!("{}/{} succeeded", run.succeeded(), run.total());

    session.teardown().await;

    if run.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

async fn generate(
    keyword: String,
    count: usize,
    out: Option<PathBuf>,
    prompt: &str,
) -> tistory_runner::Result<()> {
    let settings = Settings::load();
    let (client_id, client_secret) = match (&settings.naver_client_id, &settings.naver_client_secret)
    {
        (Some(id), Some(secret)) => (id.clone(), secret.clone()),
        _ => {
            return Err(tistory_runner::Error::Config(
                "NAVER_CLIENT_ID / NAVER_CLIENT_SECRET not set (environment or .env)".into(),
            ))
        }
    };
    let Some(api_key) = settings.gemini_api_key.clone() else {
        return Err(tistory_runner::Error::Config(
            "GEMINI_API_KEY not set (environment or .env)".into(),
        ));
    };
    let out_dir = out
        .or(settings.save_path)
        .unwrap_or_else(|| PathBuf::from("."));

    let search = NaverSearchClient::new(client_id, client_secret);
    let gemini = GeminiClient::new(api_key);

    println!("Searching blogs for '{}'...", keyword);
    let posts = search.search_blogs(&keyword, 20).await?;
    if posts.is_empty() {
        println!("No search results; nothing to generate.");
        return Ok(());
    }

    let titles = gemini.generate_titles(&posts, count).await?;
    let titles: Vec<_> = titles.into_iter().take(count).collect();
    println!("Generating {} article(s) into {}", titles.len(), out_dir.display());

    let mut saved = 0;
    for (i, title) in titles.iter().enumerate() {
        match gemini.generate_article(title, prompt).await {
            Ok(body) => match ArticleFile::save(&out_dir, title, &body) {
                Ok(path) => {
                    saved += 1;
                    println!("[{}/{}] {} -> {}", i + 1, titles.len(), title, path.display());
                }
                Err(e) => println!("[{}/{}] {} - save failed: {}", i + 1, titles.len(), title, e),
            },
            Err(e) => println!("[{}/{}] {} - generation failed: {}", i + 1, titles.len(), title, e),
        }
    }
    println!("{}/{} articles saved", saved, titles.len());
    Ok(())
}

/// Expand directories to their .txt files, in name order; keep explicit
/// file paths as-is.
fn collect_article_files(paths: &[PathBuf]) -> tistory_runner::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn wait_for_enter() {
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}
