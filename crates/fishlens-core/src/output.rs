//! Machine-readable output of identification results.
//!
//! JSON mode emits one document: a single object for one result, an array
//! for a batch. JSON Lines mode emits one compact object per line as results
//! arrive.

use serde::Serialize;
use std::io::{self, Write};

/// Serialization format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonLines,
}

impl OutputFormat {
    /// Parse a format name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes results to any `Write` sink.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON mode; JSON Lines is always compact.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write one result.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        self.write_value(item, self.pretty && self.format == OutputFormat::Json)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a batch: a JSON array, or one line per item.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.write_value(&items, self.pretty)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    fn write_value<T: Serialize + ?Sized>(&mut self, value: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationEntry, Identification, IdentificationRecord};

    fn identification(request_id: u64) -> Identification {
        Identification {
            request_id,
            source: "reef.jpg".to_string(),
            classifier: "fixed".to_string(),
            records: vec![
                IdentificationRecord {
                    label: "tiger shark".to_string(),
                    score: 0.92,
                    species: Some("tiger shark".to_string()),
                    genus: Some("tiger".to_string()),
                    common_name: Some("tiger shark".to_string()),
                },
                IdentificationRecord::bare(&ClassificationEntry::new("beach towel", 0.05)),
            ],
            no_fish_detected: false,
            latency_ms: 12,
        }
    }

    #[test]
    fn test_write_json_object() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write(&identification(1)).unwrap();
        assert_eq!(writer.items_written(), 1);

        let output = String::from_utf8(buffer).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["records"][0]["commonName"], "tiger shark");
        assert!(value["records"][1].get("species").is_none());
        assert_eq!(value["no_fish_detected"], false);
    }

    #[test]
    fn test_write_jsonl_one_line_per_item() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer
            .write_all(&[identification(1), identification(2)])
            .unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: Identification = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.request_id, 2);
    }

    #[test]
    fn test_write_all_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, true);
        writer
            .write_all(&[identification(1), identification(2)])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let parsed: Vec<Identification> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("text"), None);
    }
}
