//! Indexable records and their projection into the index schema.
//!
//! This is the entity-mapping layer: domain records (documents and their
//! attached files) are translated into field sets the index store
//! understands. Mapping is deterministic and total; it never validates
//! uniqueness or referential integrity, which belong to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tantivy::schema::{Field, Schema, FAST, INDEXED, STORED, STRING, TEXT};
use tantivy::{TantivyDocument, Term};

/// Discriminator between the two identity spaces sharing the index.
///
/// Identity is `(kind, id)`: a document and a file may carry the same `id`
/// without colliding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Document,
    File,
}

/// The exact-match identity of one index entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub kind: RecordKind,
    pub id: String,
}

impl RecordKey {
    pub fn document(id: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::Document,
            id: id.into(),
        }
    }

    pub fn file(id: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::File,
            id: id.into(),
        }
    }

    /// Canonical token stored in the `key` field; deletion and replacement
    /// match on this term.
    pub fn token(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }

    pub(crate) fn term(&self, fields: &IndexFields) -> Term {
        Term::from_field_text(fields.key, &self.token())
    }
}

/// A document as projected into the index.
///
/// `description`, `tags`, and `language` ride along as searchable
/// attributes; an empty description or tag list simply indexes nothing for
/// that field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable unique id within the document space
    pub id: String,

    /// Document title, full-text searchable
    pub title: String,

    /// Document description, full-text searchable
    pub description: String,

    /// Free-form tags, full-text searchable
    pub tags: Vec<String>,

    /// ISO language code, exact-match
    pub language: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            language: None,
            created_at: Utc::now(),
        }
    }
}

/// A file attached to a document, as projected into the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Stable unique id within the file space
    pub id: String,

    /// Owning document's id; not referentially checked
    pub document_id: String,

    /// File name, full-text searchable
    pub name: String,

    /// Extracted text content, when extraction has run
    pub content: Option<String>,
}

impl FileRecord {
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            document_id: document_id.into(),
            name: name.into(),
            content: None,
        }
    }
}

/// A record the index writer can store and replace by identity.
pub trait IndexableRecord {
    /// The `(kind, id)` identity of this record
    fn key(&self) -> RecordKey;

    /// Project the record into an index document
    fn to_index_doc(&self, fields: &IndexFields) -> TantivyDocument;
}

impl IndexableRecord for DocumentRecord {
    fn key(&self) -> RecordKey {
        RecordKey::document(self.id.clone())
    }

    fn to_index_doc(&self, fields: &IndexFields) -> TantivyDocument {
        let key = self.key().token();
        let mut doc = TantivyDocument::new();
        doc.add_text(fields.key, &key);
        doc.add_text(fields.kind, RecordKind::Document.as_ref());
        doc.add_text(fields.id, &self.id);
        doc.add_text(fields.title, &self.title);
        if !self.description.is_empty() {
            doc.add_text(fields.description, &self.description);
        }
        for tag in &self.tags {
            doc.add_text(fields.tags, tag);
        }
        if let Some(ref language) = self.language {
            doc.add_text(fields.language, language);
        }
        doc.add_date(
            fields.created_at,
            tantivy::DateTime::from_timestamp_secs(self.created_at.timestamp()),
        );
        doc
    }
}

impl IndexableRecord for FileRecord {
    fn key(&self) -> RecordKey {
        RecordKey::file(self.id.clone())
    }

    fn to_index_doc(&self, fields: &IndexFields) -> TantivyDocument {
        let key = self.key().token();
        let mut doc = TantivyDocument::new();
        doc.add_text(fields.key, &key);
        doc.add_text(fields.kind, RecordKind::File.as_ref());
        doc.add_text(fields.id, &self.id);
        doc.add_text(fields.name, &self.name);
        doc.add_text(fields.document_id, &self.document_id);
        if let Some(ref content) = self.content {
            doc.add_text(fields.content, content);
        }
        doc
    }
}

/// Field handles resolved once at schema build time.
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    pub(crate) key: Field,
    pub(crate) kind: Field,
    pub(crate) id: Field,
    pub(crate) title: Field,
    pub(crate) description: Field,
    pub(crate) tags: Field,
    pub(crate) language: Field,
    pub(crate) created_at: Field,
    pub(crate) name: Field,
    pub(crate) document_id: Field,
    pub(crate) content: Field,
}

/// Build the shared schema for document and file records.
pub(crate) fn build_schema() -> (Schema, IndexFields) {
    let mut builder = Schema::builder();

    // Identity: exact-match key and kind discriminator
    let key = builder.add_text_field("key", STRING | STORED);
    let kind = builder.add_text_field("kind", STRING | STORED);
    let id = builder.add_text_field("id", STRING | STORED);

    // Document fields
    let title = builder.add_text_field("title", TEXT | STORED);
    let description = builder.add_text_field("description", TEXT | STORED);
    let tags = builder.add_text_field("tags", TEXT | STORED);
    let language = builder.add_text_field("language", STRING | STORED);
    let created_at = builder.add_date_field("created_at", INDEXED | STORED | FAST);

    // File fields
    let name = builder.add_text_field("name", TEXT | STORED);
    let document_id = builder.add_text_field("document_id", STRING | STORED);
    let content = builder.add_text_field("content", TEXT | STORED);

    let schema = builder.build();
    let fields = IndexFields {
        key,
        kind,
        id,
        title,
        description,
        tags,
        language,
        created_at,
        name,
        document_id,
        content,
    };
    (schema, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tantivy::schema::Value;

    #[test]
    fn schema_carries_all_fields() {
        let (schema, _) = build_schema();
        for name in [
            "key",
            "kind",
            "id",
            "title",
            "description",
            "tags",
            "language",
            "created_at",
            "name",
            "document_id",
            "content",
        ] {
            assert!(schema.get_field(name).is_ok(), "missing field {name}");
        }
    }

    #[test]
    fn document_and_file_keys_do_not_collide() {
        let doc = DocumentRecord::new("1", "Test Document");
        let file = FileRecord::new("1", "doc1", "Test File");

        assert_ne!(doc.key().token(), file.key().token());
        assert_eq!(doc.key().token(), "document:1");
        assert_eq!(file.key().token(), "file:1");
    }

    #[test]
    fn document_projection_carries_title_and_kind() {
        let (_, fields) = build_schema();
        let mut record = DocumentRecord::new("42", "Quarterly Report");
        record.tags = vec!["finance".to_string(), "q3".to_string()];

        let doc = record.to_index_doc(&fields);
        let title = doc.get_first(fields.title).and_then(|v| v.as_str());
        let kind = doc.get_first(fields.kind).and_then(|v| v.as_str());

        assert_eq!(title, Some("Quarterly Report"));
        assert_eq!(kind, Some("document"));
        assert_eq!(doc.get_all(fields.tags).count(), 2);
    }

    #[test]
    fn file_projection_carries_owning_document() {
        let (_, fields) = build_schema();
        let record = FileRecord::new("f1", "doc-9", "scan.pdf");

        let doc = record.to_index_doc(&fields);
        let document_id = doc.get_first(fields.document_id).and_then(|v| v.as_str());

        assert_eq!(document_id, Some("doc-9"));
    }
}
