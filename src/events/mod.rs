mod crawler;
mod data;

pub use crawler::{EventsCrawler, TextMode, Variant};
pub use data::{EventRecordTable, EventsData};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One extracted event paragraph, optionally paired with its heading.
///
/// `title` is omitted from serialized output when absent, so feeds of
/// title-less records only carry a `description` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(t) = self.title.as_ref() {
            writeln!(f, "Title       : {}", t)?;
        }
        write!(
            f,
            "Description : {}",
            self.description.replace('\n', "\n              ")
        )
    }
}
