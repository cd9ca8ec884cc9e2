//! Tabular rows: page metadata plus one chunk's match record.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::result::{MatchResult, label};

/// Fixed columns that precede the match record.
const LEADING_COLUMNS: [&str; 6] = ["item_id", "publisher", "title", "pub_date", "page_num", "chunk"];

const RAW_COLUMN: &str = "raw_response";

/// Where a chunk came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub item_id: String,
    pub publisher: String,
    pub title: String,
    pub pub_date: String,
    pub page_num: u32,
}

/// One output row. Serializes to the columns in [`ChunkRow::header`] order.
#[derive(Debug, Clone, Copy)]
pub struct ChunkRow<'a> {
    pub meta: &'a PageMeta,
    pub chunk: &'a str,
    pub result: &'a MatchResult,
}

impl<'a> ChunkRow<'a> {
    pub fn new(meta: &'a PageMeta, chunk: &'a str, result: &'a MatchResult) -> Self {
        Self {
            meta,
            chunk,
            result,
        }
    }

    /// Column names for a vocabulary of `term_count` terms.
    pub fn header(term_count: usize) -> Vec<String> {
        LEADING_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(std::iter::once("success".to_string()))
            .chain((0..term_count).map(label))
            .chain(std::iter::once(RAW_COLUMN.to_string()))
            .collect()
    }
}

impl Serialize for ChunkRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = LEADING_COLUMNS.len() + 2 + self.result.term_count();
        let mut map = serializer.serialize_map(Some(len))?;
        let [item_id, publisher, title, pub_date, page_num, chunk] = LEADING_COLUMNS;
        map.serialize_entry(item_id, &self.meta.item_id)?;
        map.serialize_entry(publisher, &self.meta.publisher)?;
        map.serialize_entry(title, &self.meta.title)?;
        map.serialize_entry(pub_date, &self.meta.pub_date)?;
        map.serialize_entry(page_num, &self.meta.page_num)?;
        map.serialize_entry(chunk, self.chunk)?;
        self.result.serialize_entries(&mut map)?;
        map.serialize_entry(RAW_COLUMN, &self.result.raw_response())?;
        map.end()
    }
}
