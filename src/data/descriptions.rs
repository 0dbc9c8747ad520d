//! Description table (CSV)

use super::{DescriptionTable, TopicId};
use crate::error::{LoadError, LoadResult};
use serde::Deserialize;
use tracing::warn;

pub const TOPIC_COLUMN: &str = "Topic Number";
pub const DESCRIPTION_COLUMN: &str = "Description";

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Topic Number")]
    topic: String,
    #[serde(rename = "Description", default)]
    description: String,
}

/// Decode the CSV into a lookup table
///
/// Extra columns are ignored. Rows whose key is not a topic number are
/// skipped with a warning; a repeated key keeps the last description.
pub fn parse(bytes: &[u8]) -> LoadResult<DescriptionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for required in [TOPIC_COLUMN, DESCRIPTION_COLUMN] {
        if !headers.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }

    let mut table = DescriptionTable::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<Row>() {
        let row = row?;
        match TopicId::parse(&row.topic) {
            Some(topic) => table.insert(topic, row.description),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "description rows without a usable topic number");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let csv = "Topic Number,Description\n0,Border policy debate\n1,\"Asylum, courts and backlog\"\n";
        let table = parse(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(TopicId(0)), Some("Border policy debate"));
        assert_eq!(table.get(TopicId(1)), Some("Asylum, courts and backlog"));
    }

    #[test]
    fn test_parse_ignores_extra_columns() {
        let csv = "Count,Topic Number,Name,Description\n10,4,four,The fourth topic\n";
        let table = parse(csv.as_bytes()).unwrap();
        assert_eq!(table.get(TopicId(4)), Some("The fourth topic"));
    }

    #[test]
    fn test_parse_label_style_keys() {
        let csv = "Topic Number,Description\nTopic 12,Twelve\n7.0,Seven\n";
        let table = parse(csv.as_bytes()).unwrap();
        assert_eq!(table.get(TopicId(12)), Some("Twelve"));
        assert_eq!(table.get(TopicId(7)), Some("Seven"));
    }

    #[test]
    fn test_parse_multiline_description() {
        let csv = "Topic Number,Description\n3,\"Line one\nLine two\"\n";
        let table = parse(csv.as_bytes()).unwrap();
        assert_eq!(table.get(TopicId(3)), Some("Line one\nLine two"));
    }

    #[test]
    fn test_parse_skips_unusable_keys() {
        let csv = "Topic Number,Description\n,orphan\nnoise,also orphan\n2,kept\n";
        let table = parse(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(TopicId(2)), Some("kept"));
    }

    #[test]
    fn test_parse_duplicate_key_last_wins() {
        let csv = "Topic Number,Description\n1,old\n1,new\n";
        let table = parse(csv.as_bytes()).unwrap();
        assert_eq!(table.get(TopicId(1)), Some("new"));
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "Topic,Description\n1,x\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == TOPIC_COLUMN));

        let csv = "Topic Number,Text\n1,x\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == DESCRIPTION_COLUMN));
    }

    #[test]
    fn test_parse_padded_headers() {
        let csv = " Topic Number , Description \n5,padded\n";
        let table = parse(csv.as_bytes()).unwrap();
        assert_eq!(table.get(TopicId(5)), Some("padded"));
    }

    #[test]
    fn test_parse_header_only() {
        let table = parse(b"Topic Number,Description\n").unwrap();
        assert!(table.is_empty());
    }
}
