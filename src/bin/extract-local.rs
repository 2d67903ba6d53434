use clap::Parser;
use hlhw_crawler::events::{EventsCrawler, TextMode, Variant};
use hlhw_crawler::Crawler;
use scraper::Html;
use std::path::PathBuf;

/// Run the events extractor on a saved page and print the records.
#[derive(Debug, Parser)]
struct Args {
    file: PathBuf,

    #[arg(long, value_enum, default_value_t = Variant::Paragraphs)]
    variant: Variant,

    #[arg(long, value_enum, default_value_t = TextMode::Tree)]
    text_mode: TextMode,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let html = std::fs::read_to_string(&args.file)?;
    let doc = Html::parse_document(&html);

    let crawler = EventsCrawler {
        variant: args.variant,
        text_mode: args.text_mode,
        ..EventsCrawler::default()
    };
    for (i, record) in crawler.crawl(&doc).iter().enumerate() {
        println!("[{}]\n{}\n", i + 1, record);
    }

    Ok(())
}
