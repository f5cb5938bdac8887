use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Document;

/// A document as returned by one similarity search.
///
/// `score` is only meaningful next to other hits of the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
    /// 0-based position in the query's result list.
    pub rank: usize,
}

impl ScoredDocument {
    pub fn new(document: Document, score: f64, rank: usize) -> Self {
        Self {
            document,
            score,
            rank,
        }
    }
}

/// Unique documents collected across several per-query result lists.
///
/// Documents are unique by `page_content`. Iteration yields them in order of
/// first appearance when the lists are visited in the order they were given;
/// equality compares the sets of contents and ignores that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedResultSet {
    documents: Vec<Document>,
}

impl MergedResultSet {
    /// Flatten ranked lists and drop every document whose content was already seen.
    ///
    /// The first occurrence wins, so its metadata is the one kept. Scores are dropped.
    pub fn from_ranked_lists<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = Vec<ScoredDocument>>,
    {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for hits in lists {
            for hit in hits {
                if seen.insert(hit.document.page_content.clone()) {
                    documents.push(hit.document);
                }
            }
        }

        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    pub fn contains_content(&self, content: &str) -> bool {
        self.documents.iter().any(|d| d.page_content == content)
    }

    pub fn contents(&self) -> HashSet<&str> {
        self.documents
            .iter()
            .map(|d| d.page_content.as_str())
            .collect()
    }
}

impl PartialEq for MergedResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.contents() == other.contents()
    }
}

impl IntoIterator for MergedResultSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl<'a> IntoIterator for &'a MergedResultSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
