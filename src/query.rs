//! Search queries over the current snapshot.
//!
//! Deliberately thin: free text across the searchable fields plus exact
//! filters for record kind and owning document. Query-language design and
//! ranking tuning stay out of scope.

use crate::error::{IndexError, IndexResult};
use crate::record::{IndexFields, RecordKind};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{TantivyDocument, Term};

/// A search request against the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query across title, description, tags, name, and content
    pub text: String,

    /// Restrict hits to one identity space
    pub kind: Option<RecordKind>,

    /// Restrict hits to the files of one document
    pub document_id: Option<String>,

    /// Number of results to return
    pub limit: usize,

    /// Offset for pagination
    pub offset: usize,
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: None,
            document_id: None,
            limit: 20,
            offset: 0,
        }
    }

    /// Match everything; combine with filters to enumerate a subset.
    pub fn all() -> Self {
        Self::new("")
    }

    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// A single search hit, materialized from stored fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Record id
    pub id: String,

    /// Identity space ("document" or "file")
    pub kind: String,

    /// Document title, when the hit is a document
    pub title: Option<String>,

    /// File name, when the hit is a file
    pub name: Option<String>,

    /// Owning document id, when the hit is a file
    pub document_id: Option<String>,

    /// Relevance score
    pub score: f32,
}

/// Search results with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Hits for the requested page
    pub hits: Vec<SearchHit>,

    /// Total number of hits before pagination
    pub total_hits: usize,

    /// Offset used for pagination
    pub offset: usize,

    /// Limit used for pagination
    pub limit: usize,
}

/// Execute `query` against `snapshot`.
pub(crate) fn execute(
    query: &SearchQuery,
    snapshot: &Snapshot,
    fields: &IndexFields,
    max_results: usize,
) -> IndexResult<SearchResponse> {
    let searcher = snapshot.searcher();
    let parsed = build_query(query, searcher.index(), fields)?;

    let limit = query.limit.min(max_results).max(1);
    let collector = TopDocs::with_limit(limit).and_offset(query.offset);

    let top_docs = searcher
        .search(&*parsed, &collector)
        .map_err(IndexError::from_read)?;
    let total_hits = searcher
        .search(&*parsed, &Count)
        .map_err(IndexError::from_read)?;

    let mut hits = Vec::with_capacity(top_docs.len());
    for (score, address) in top_docs {
        let doc: TantivyDocument = searcher.doc(address).map_err(IndexError::from_read)?;
        hits.push(hit_from_doc(&doc, fields, score));
    }

    Ok(SearchResponse {
        hits,
        total_hits,
        offset: query.offset,
        limit: query.limit,
    })
}

fn build_query(
    query: &SearchQuery,
    index: &tantivy::Index,
    fields: &IndexFields,
) -> IndexResult<Box<dyn Query>> {
    let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

    if !query.text.is_empty() {
        let parser = QueryParser::for_index(
            index,
            vec![
                fields.title,
                fields.description,
                fields.tags,
                fields.name,
                fields.content,
            ],
        );
        let parsed = parser
            .parse_query(&query.text)
            .map_err(|e| IndexError::Query(e.to_string()))?;
        subqueries.push((Occur::Must, parsed));
    }

    if let Some(kind) = query.kind {
        subqueries.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_text(fields.kind, kind.as_ref()),
                IndexRecordOption::Basic,
            )),
        ));
    }

    if let Some(ref document_id) = query.document_id {
        subqueries.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_text(fields.document_id, document_id),
                IndexRecordOption::Basic,
            )),
        ));
    }

    match subqueries.len() {
        0 => Ok(Box::new(AllQuery)),
        1 => Ok(subqueries.into_iter().next().map(|(_, q)| q).unwrap()),
        _ => Ok(Box::new(BooleanQuery::from(subqueries))),
    }
}

fn hit_from_doc(doc: &TantivyDocument, fields: &IndexFields, score: f32) -> SearchHit {
    let text = |field| {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    SearchHit {
        id: text(fields.id).unwrap_or_default(),
        kind: text(fields.kind).unwrap_or_default(),
        title: text(fields.title),
        name: text(fields.name),
        document_id: text(fields.document_id),
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_composes() {
        let query = SearchQuery::new("quarterly report")
            .with_kind(RecordKind::File)
            .with_document_id("doc-1")
            .with_limit(50)
            .with_offset(10);

        assert_eq!(query.text, "quarterly report");
        assert_eq!(query.kind, Some(RecordKind::File));
        assert_eq!(query.document_id.as_deref(), Some("doc-1"));
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 10);
    }

    #[test]
    fn match_all_has_no_constraints() {
        let query = SearchQuery::all();
        assert!(query.text.is_empty());
        assert!(query.kind.is_none());
        assert!(query.document_id.is_none());
    }
}
