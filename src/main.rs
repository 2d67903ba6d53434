use clap::{Args, Parser, Subcommand};
use hlhw_crawler::events::{EventRecord, EventsCrawler, EventsData, TextMode, Variant};
use hlhw_crawler::feed::{FeedFormat, FeedSink, FeedTarget};
use hlhw_crawler::settings::{Settings, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, EVENTS_URL};
use hlhw_crawler::{crawler_names, events_crawler, run_crawler, Fetcher, NullSink};
use std::time::Duration;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about = "Holocaust Living History Workshop events crawler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a crawler and export its records
    Crawl(CrawlArgs),
    /// List available crawlers
    List,
}

#[derive(Debug, Args)]
struct CrawlArgs {
    /// Crawler name
    name: String,

    /// Append records to FEED (`path[:format]`)
    #[arg(short = 'o', long = "output", value_name = "FEED", conflicts_with = "overwrite_output")]
    output: Option<String>,

    /// Overwrite FEED with records (`path[:format]`)
    #[arg(short = 'O', long = "overwrite-output", value_name = "FEED")]
    overwrite_output: Option<String>,

    #[arg(long, value_enum, default_value_t = Variant::Paragraphs)]
    variant: Variant,

    #[arg(long, value_enum, default_value_t = TextMode::Tree)]
    text_mode: TextMode,

    #[arg(long, env = "HLHW_URL", default_value = EVENTS_URL)]
    url: String,

    #[arg(long, env = "HLHW_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Request timeout in seconds
    #[arg(long, env = "HLHW_TIMEOUT", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

impl CrawlArgs {
    fn feed(&self) -> Result<Option<FeedTarget>, hlhw_crawler::CrawlerError> {
        match (&self.output, &self.overwrite_output) {
            (Some(s), _) => FeedTarget::parse(s, false).map(Some),
            (None, Some(s)) => FeedTarget::parse(s, true).map(Some),
            (None, None) => Ok(None),
        }
    }

    fn settings(&self) -> Settings {
        Settings {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

async fn crawl(args: CrawlArgs) -> Result<(), Box<dyn std::error::Error>> {
    let crawler = events_crawler(
        &args.name,
        EventsCrawler {
            url: args.url.clone(),
            variant: args.variant,
            text_mode: args.text_mode,
        },
    )?;
    let fetcher = Fetcher::new(&args.settings())?;

    match args.feed()? {
        None => {
            let mut sink = NullSink::<EventRecord>::default();
            run_crawler(&crawler, &fetcher, &mut sink).await?;
        }
        Some(target) if target.format == FeedFormat::Sqlite => {
            let mut sink =
                EventsData::new(&target.path, EventsCrawler::NAME, target.overwrite).await?;
            run_crawler(&crawler, &fetcher, &mut sink).await?;
        }
        Some(target) => {
            let mut sink = FeedSink::<EventRecord>::open(&target)?;
            run_crawler(&crawler, &fetcher, &mut sink).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    match Cli::parse().command {
        Command::Crawl(args) => crawl(args).await?,
        Command::List => {
            for name in crawler_names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scrapy_style_invocation() {
        let cli = Cli::try_parse_from(["hlhw-crawler", "crawl", "events", "-o", "data.csv"]).unwrap();
        let Command::Crawl(args) = cli.command else {
            panic!("expected crawl")
        };
        assert_eq!(args.name, "events");
        assert_eq!(args.variant, Variant::Paragraphs);
        assert_eq!(args.feed().unwrap().unwrap().format, FeedFormat::Csv);
        assert_eq!(args.settings().timeout, DEFAULT_TIMEOUT);
    }

    fn args(url: &str, output: Option<String>) -> CrawlArgs {
        CrawlArgs {
            name: "events".to_string(),
            output: None,
            overwrite_output: output,
            variant: Variant::Headings,
            text_mode: TextMode::Tree,
            url: url.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: 5,
        }
    }

    #[tokio::test]
    async fn crawl_writes_each_feed_kind() {
        let server = MockServer::start().await;
        let html = std::fs::read_to_string("tests/htmls/events.html").unwrap();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;
        let url = server.uri();
        let dir = tempfile::tempdir().unwrap();

        crawl(args(&url, None)).await.unwrap();

        let csv = dir.path().join("data.csv");
        crawl(args(&url, Some(csv.display().to_string())))
            .await
            .unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.lines().next(), Some("title,description"));

        let db = dir.path().join("data.db");
        crawl(args(&url, Some(db.display().to_string())))
            .await
            .unwrap();
        let data = EventsData::new(&db, EventsCrawler::NAME, false)
            .await
            .unwrap();
        assert_eq!(data.results_get().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn crawl_rejects_unknown_crawler() {
        let mut a = args("http://127.0.0.1:1/", None);
        a.name = "quotes".to_string();
        assert!(crawl(a).await.is_err());
    }

    #[test]
    fn output_flags_conflict() {
        assert!(Cli::try_parse_from([
            "hlhw-crawler", "crawl", "events", "-o", "a.csv", "-O", "b.csv"
        ])
        .is_err());
    }
}
