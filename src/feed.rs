//! File feeds: CSV, JSON and JSON lines exports of scraped records.

use crate::{CrawlerError, Sink};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Csv,
    Json,
    JsonLines,
    Sqlite,
}

impl FromStr for FeedFormat {
    type Err = CrawlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(FeedFormat::Csv),
            "json" => Ok(FeedFormat::Json),
            "jl" | "jsonl" | "jsonlines" => Ok(FeedFormat::JsonLines),
            "db" | "sqlite" | "sqlite3" => Ok(FeedFormat::Sqlite),
            _ => Err(CrawlerError::UnknownFeedFormat(s.to_string())),
        }
    }
}

/// Where and how to write records, parsed from `path[:format]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTarget {
    pub path: PathBuf,
    pub format: FeedFormat,
    pub overwrite: bool,
}

impl FeedTarget {
    pub fn parse(s: &str, overwrite: bool) -> Result<FeedTarget, CrawlerError> {
        if let Some((path, format)) = s.rsplit_once(':') {
            if let Ok(format) = format.parse() {
                return Ok(FeedTarget {
                    path: PathBuf::from(path),
                    format,
                    overwrite,
                });
            }
        }

        let path = PathBuf::from(s);
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CrawlerError::UnknownFeedFormat(s.to_string()))?
            .parse()?;
        Ok(FeedTarget {
            path,
            format,
            overwrite,
        })
    }
}

enum FeedWriter {
    Csv {
        writer: csv::Writer<File>,
        path: PathBuf,
        /// Header line of the file being appended to, checked against the first record.
        existing_header: Option<String>,
    },
    Json { out: BufWriter<File>, first: bool },
    JsonLines(BufWriter<File>),
}

/// Serializes records of type `R` into a file feed.
pub struct FeedSink<R> {
    writer: FeedWriter,
    _record: PhantomData<fn(R)>,
}

fn has_content(path: &Path) -> bool {
    path.metadata().map(|m| m.len() > 0).unwrap_or(false)
}

fn first_line(path: &Path) -> Result<String, CrawlerError> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn csv_header<R: Serialize>(record: &R) -> Result<String, CrawlerError> {
    let mut w = csv::Writer::from_writer(vec![]);
    w.serialize(record)?;
    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

impl<R> FeedSink<R> {
    pub fn open(target: &FeedTarget) -> Result<FeedSink<R>, CrawlerError> {
        let append = !target.overwrite;
        let existing = append && has_content(&target.path);
        let open = |path: &Path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .append(append)
                .truncate(!append)
                .open(path)
        };

        let writer = match target.format {
            FeedFormat::Csv => FeedWriter::Csv {
                existing_header: if existing {
                    Some(first_line(&target.path)?)
                } else {
                    None
                },
                writer: csv::WriterBuilder::new()
                    .has_headers(!existing)
                    .from_writer(open(&target.path)?),
                path: target.path.clone(),
            },
            FeedFormat::Json => {
                if existing {
                    return Err(CrawlerError::AppendUnsupported(
                        target.path.display().to_string(),
                    ));
                }
                let mut out = BufWriter::new(open(&target.path)?);
                out.write_all(b"[")?;
                FeedWriter::Json { out, first: true }
            }
            FeedFormat::JsonLines => FeedWriter::JsonLines(BufWriter::new(open(&target.path)?)),
            FeedFormat::Sqlite => {
                return Err(CrawlerError::NotAFileFeed(
                    target.path.display().to_string(),
                ))
            }
        };

        Ok(FeedSink {
            writer,
            _record: PhantomData,
        })
    }
}

#[async_trait::async_trait]
impl<R> Sink for FeedSink<R>
where
    R: Serialize + Send + 'static,
{
    type Record = R;

    async fn insert(&mut self, _url: &str, records: Vec<R>) -> Result<usize, CrawlerError> {
        for record in &records {
            match &mut self.writer {
                FeedWriter::Csv {
                    writer,
                    path,
                    existing_header,
                } => {
                    if let Some(existing) = existing_header.take() {
                        let found = csv_header(record)?;
                        if existing != found {
                            return Err(CrawlerError::HeaderMismatch {
                                path: path.display().to_string(),
                                existing,
                                found,
                            });
                        }
                    }
                    writer.serialize(record)?
                }
                FeedWriter::Json { out, first } => {
                    if !*first {
                        out.write_all(b",")?;
                    }
                    out.write_all(b"\n")?;
                    serde_json::to_writer(&mut *out, record)?;
                    *first = false;
                }
                FeedWriter::JsonLines(out) => {
                    serde_json::to_writer(&mut *out, record)?;
                    out.write_all(b"\n")?;
                }
            }
        }
        Ok(records.len())
    }

    async fn finish(&mut self) -> Result<(), CrawlerError> {
        match &mut self.writer {
            FeedWriter::Csv { writer, .. } => writer.flush()?,
            FeedWriter::Json { out, .. } => {
                out.write_all(b"\n]")?;
                out.flush()?;
            }
            FeedWriter::JsonLines(out) => out.flush()?,
        }
        Ok(())
    }
}
