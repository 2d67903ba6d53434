use crate::{events::EventRecord, settings::EVENTS_URL, Crawler};
use lazy_regex::regex;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

const E: &str = "Invalid selector";
lazy_static! {
    static ref P: Selector = Selector::parse("p").expect(E);
    static ref H3: Selector = Selector::parse("h3").expect(E);
}

/// How paragraphs are turned into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Variant {
    /// One record per `<p>`, without a title.
    #[default]
    Paragraphs,
    /// `<h3>` headings paired with `<p>` by position, the first heading being the page title.
    Headings,
}

/// How an element is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TextMode {
    /// Descendant text nodes, whitespace collapsed.
    #[default]
    Tree,
    /// Trimmed outer HTML with the bare opening and closing tag strings removed.
    /// Attributed or nested tags are left in place.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct EventsCrawler {
    pub url: String,
    pub variant: Variant,
    pub text_mode: TextMode,
}

impl Default for EventsCrawler {
    fn default() -> Self {
        EventsCrawler {
            url: EVENTS_URL.to_string(),
            variant: Variant::default(),
            text_mode: TextMode::default(),
        }
    }
}

impl EventsCrawler {
    pub const NAME: &'static str = "events";

    fn text(&self, el: ElementRef<'_>) -> String {
        match self.text_mode {
            TextMode::Tree => {
                let text = el.text().collect::<String>();
                regex!(r"\s+").replace_all(&text, " ").trim().to_string()
            }
            TextMode::Legacy => {
                let tag = el.value().name();
                el.html()
                    .trim()
                    .replace(&format!("<{}>", tag), "")
                    .replace(&format!("</{}>", tag), "")
            }
        }
    }
}

impl Crawler for EventsCrawler {
    type Record = EventRecord;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn start_urls(&self) -> Vec<String> {
        vec![self.url.clone()]
    }

    fn crawl(&self, doc: &Html) -> Vec<Self::Record> {
        let paragraphs = doc.select(&P).map(|p| self.text(p));

        match self.variant {
            Variant::Paragraphs => paragraphs
                .map(|description| EventRecord {
                    title: None,
                    description,
                })
                .collect(),
            Variant::Headings => doc
                .select(&H3)
                .skip(1)
                .map(|h| self.text(h))
                .zip(paragraphs)
                .map(|(title, description)| EventRecord {
                    title: Some(title),
                    description,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn crawler(variant: Variant, text_mode: TextMode) -> EventsCrawler {
        EventsCrawler {
            variant,
            text_mode,
            ..EventsCrawler::default()
        }
    }

    fn record(title: Option<&str>, description: &str) -> EventRecord {
        EventRecord {
            title: title.map(ToString::to_string),
            description: description.to_string(),
        }
    }

    fn page(headings: usize, paragraphs: usize) -> Html {
        let mut body = String::new();
        for i in 0..headings {
            body.push_str(&format!("<h3>H{}</h3>", i));
        }
        for i in 1..=paragraphs {
            body.push_str(&format!("<p>P{}</p>", i));
        }
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn headings_count_is_min_of_paragraphs_and_headings_after_title() {
        for mode in [TextMode::Tree, TextMode::Legacy] {
            let c = crawler(Variant::Headings, mode);
            for n in 0..5 {
                for m in 1..5 {
                    let records = c.crawl(&page(m, n));
                    assert_eq!(records.len(), n.min(m - 1), "n={} m={}", n, m);
                }
            }
        }
    }

    #[test]
    fn paragraphs_count_matches_paragraph_elements() {
        let c = crawler(Variant::Paragraphs, TextMode::Tree);
        for n in 0..5 {
            for m in 0..3 {
                let records = c.crawl(&page(m, n));
                assert_eq!(records.len(), n);
                assert!(records.iter().all(|r| r.title.is_none()));
            }
        }
    }

    #[test]
    fn no_paragraphs_yields_nothing() {
        let doc = page(3, 0);
        for variant in [Variant::Paragraphs, Variant::Headings] {
            for mode in [TextMode::Tree, TextMode::Legacy] {
                assert!(crawler(variant, mode).crawl(&doc).is_empty());
            }
        }
    }

    #[test]
    fn no_headings_yields_nothing_when_pairing() {
        let c = crawler(Variant::Headings, TextMode::Tree);
        assert!(c.crawl(&page(0, 3)).is_empty());
    }

    #[test]
    fn truncates_to_shorter_side() {
        let doc = page(2, 3);
        let c = crawler(Variant::Headings, TextMode::Legacy);
        assert_eq!(c.crawl(&doc), vec![record(Some("H1"), "P1")]);
    }

    #[test]
    fn paragraphs_have_no_title() {
        let doc = page(0, 2);
        let c = crawler(Variant::Paragraphs, TextMode::Legacy);
        assert_eq!(
            c.crawl(&doc),
            vec![record(None, "P1"), record(None, "P2")]
        );
    }

    #[test]
    fn strips_tag_markers() {
        let doc = Html::parse_document("<h3>Page</h3><h3>Intro</h3><p>Hello</p>");
        for mode in [TextMode::Tree, TextMode::Legacy] {
            let c = crawler(Variant::Headings, mode);
            assert_eq!(c.crawl(&doc), vec![record(Some("Intro"), "Hello")]);
        }
    }

    #[test]
    fn legacy_keeps_attributes_and_nested_tags() {
        let doc = Html::parse_document(
            r#"<p class="lead">Lead</p><p>  See <a href="/x">this</a>  </p>"#,
        );
        let c = crawler(Variant::Paragraphs, TextMode::Legacy);
        assert_eq!(
            c.crawl(&doc),
            vec![
                record(None, r#"<p class="lead">Lead"#),
                record(None, r#"  See <a href="/x">this</a>  "#),
            ]
        );
    }

    #[test]
    fn tree_extracts_inner_text() {
        let doc = Html::parse_document(
            "<p class=\"lead\">Lead</p><p>  See <a href=\"/x\">this</a>\n  <em>now</em> </p>",
        );
        let c = crawler(Variant::Paragraphs, TextMode::Tree);
        assert_eq!(
            c.crawl(&doc),
            vec![record(None, "Lead"), record(None, "See this now")]
        );
    }

    #[test]
    fn crawl_is_idempotent() {
        let doc = page(4, 6);
        let c = crawler(Variant::Headings, TextMode::Tree);
        assert_eq!(c.crawl(&doc), c.crawl(&doc));
    }

    #[test]
    fn default_targets_events_page() {
        let c = EventsCrawler::default();
        assert_eq!(c.name(), "events");
        assert_eq!(c.start_urls(), vec![EVENTS_URL.to_string()]);
        assert_eq!(c.variant, Variant::Paragraphs);
        assert_eq!(c.text_mode, TextMode::Tree);
    }
}
