//! Paragraph model — an immutable view of a document revision.
//!
//! A [`DocumentSnapshot`] is produced once per fetch and never mutated; a new
//! revision produces a new snapshot. Paragraph offsets are half-open byte
//! ranges into the document text, non-overlapping and strictly increasing by
//! index, with `end_offset - start_offset == text.len()`.

use serde::{Deserialize, Serialize};

/// A single paragraph of a document revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Zero-based position within the snapshot.
    pub index: usize,
    /// Byte offset of the first character, inclusive.
    pub start_offset: usize,
    /// Byte offset past the last character, exclusive.
    pub end_offset: usize,
    /// Paragraph text, including any trailing newline present in the document.
    pub text: String,
}

impl Paragraph {
    /// Create a paragraph at `start_offset`; the end offset is derived from the text.
    #[must_use]
    pub fn new(index: usize, start_offset: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            start_offset,
            end_offset: start_offset + text.len(),
            text,
        }
    }

    /// Size of this paragraph's text in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.text.len()
    }
}

/// An immutable snapshot of one document revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Stable document identifier assigned by the document source.
    pub document_id: String,
    /// Revision identifier for this snapshot's content.
    pub revision_id: String,
    /// Paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,
}

impl DocumentSnapshot {
    /// Create a snapshot from already-constructed paragraphs.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        revision_id: impl Into<String>,
        paragraphs: Vec<Paragraph>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            revision_id: revision_id.into(),
            paragraphs,
        }
    }

    /// Build a snapshot from plain document text.
    ///
    /// Paragraphs are newline-terminated runs; each keeps its trailing `\n`
    /// so the concatenation of all paragraph texts reproduces the input
    /// exactly and the offsets index into it directly.
    #[must_use]
    pub fn from_text(
        document_id: impl Into<String>,
        revision_id: impl Into<String>,
        text: &str,
    ) -> Self {
        let mut paragraphs = Vec::new();
        let mut offset = 0;
        for (index, line) in text.split_inclusive('\n').enumerate() {
            let para = Paragraph::new(index, offset, line);
            offset = para.end_offset;
            paragraphs.push(para);
        }
        Self::new(document_id, revision_id, paragraphs)
    }

    /// Look up a paragraph by its index.
    #[must_use]
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index).filter(|p| p.index == index)
    }

    /// The full document text (concatenation of all paragraphs).
    #[must_use]
    pub fn text(&self) -> String {
        self.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_end_offset_matches_text_len() {
        let para = Paragraph::new(0, 10, "hello\n");
        assert_eq!(para.end_offset, 16);
        assert_eq!(para.byte_size(), 6);
    }

    #[test]
    fn from_text_splits_on_newlines() {
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", "one\ntwo\nthree");
        assert_eq!(snap.paragraphs.len(), 3);
        assert_eq!(snap.paragraphs[0].text, "one\n");
        assert_eq!(snap.paragraphs[1].text, "two\n");
        assert_eq!(snap.paragraphs[2].text, "three");
    }

    #[test]
    fn from_text_offsets_are_contiguous() {
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", "one\ntwo\nthree");
        assert_eq!(snap.paragraphs[0].start_offset, 0);
        assert_eq!(snap.paragraphs[0].end_offset, 4);
        assert_eq!(snap.paragraphs[1].start_offset, 4);
        assert_eq!(snap.paragraphs[1].end_offset, 8);
        assert_eq!(snap.paragraphs[2].start_offset, 8);
        assert_eq!(snap.paragraphs[2].end_offset, 13);
    }

    #[test]
    fn from_text_roundtrips() {
        let text = "Teh cat sat.\nIt was fine.";
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", text);
        assert_eq!(snap.text(), text);
    }

    #[test]
    fn from_text_empty_document() {
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", "");
        assert!(snap.paragraphs.is_empty());
        assert_eq!(snap.text(), "");
    }

    #[test]
    fn from_text_trailing_newline() {
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", "only\n");
        assert_eq!(snap.paragraphs.len(), 1);
        assert_eq!(snap.paragraphs[0].text, "only\n");
    }

    #[test]
    fn paragraph_lookup_by_index() {
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", "a\nb\nc");
        assert_eq!(snap.paragraph(1).map(|p| p.text.as_str()), Some("b\n"));
        assert!(snap.paragraph(5).is_none());
    }

    #[test]
    fn serde_uses_camel_case() {
        let para = Paragraph::new(0, 0, "x");
        let json = serde_json::to_value(&para).unwrap();
        assert!(json.get("startOffset").is_some());
        assert!(json.get("endOffset").is_some());
    }

    #[test]
    fn multibyte_offsets_count_bytes() {
        let snap = DocumentSnapshot::from_text("doc-1", "rev-1", "héllo\nx");
        // 'é' is two bytes in UTF-8
        assert_eq!(snap.paragraphs[0].end_offset, 7);
        assert_eq!(snap.paragraphs[1].start_offset, 7);
    }
}
