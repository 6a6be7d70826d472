//! Recursive, boundary-aware text splitting.
//!
//! Text is first cut into pieces no longer than the window size, preferring
//! paragraph breaks, then line breaks, sentence ends, spaces, and finally
//! arbitrary character positions. Separators stay attached to the piece they
//! end, so the pieces tile the text exactly. Consecutive pieces are then
//! merged into windows; each new window re-uses trailing pieces of the
//! previous one up to the overlap budget. Windows therefore overlap or abut
//! and together cover the whole text.
//!
//! Lengths are counted in characters, not bytes.

use std::ops::Range;
use bdn_core::TextChunk;
use super::documents::ArticleDocument;

pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
}

/// A window of the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Character offset of the window in the source text
    pub start: usize,
    pub text: String,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<Window> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut pieces = Vec::new();
        self.collect_pieces(text, 0..text.len(), &self.separators, &mut pieces);

        self.merge(text, &pieces)
            .into_iter()
            .map(|range| Window {
                start: text[..range.start].chars().count(),
                text: text[range].to_string(),
            })
            .collect()
    }

    /// Splits a document into chunks carrying its metadata. Chunk ids are
    /// `{url}#{index}`.
    pub fn split_document(&self, document: &ArticleDocument) -> Vec<TextChunk> {
        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(index, window)| TextChunk {
                id: format!("{}#{}", document.metadata.url, index),
                text: window.text,
                metadata: document.metadata.clone(),
                chunk_index: index,
                start: window.start,
            })
            .collect()
    }

    /// Byte ranges, each at most `chunk_size` characters, tiling `range`.
    fn collect_pieces(
        &self,
        text: &str,
        range: Range<usize>,
        separators: &[&str],
        out: &mut Vec<Range<usize>>,
    ) {
        let slice = &text[range.clone()];
        if char_len(slice) <= self.chunk_size {
            out.push(range);
            return;
        }

        match separators.split_first() {
            Some((separator, rest)) if !separator.is_empty() => {
                if !slice.contains(separator) {
                    self.collect_pieces(text, range, rest, out);
                    return;
                }
                let mut start = range.start;
                for (offset, _) in slice.match_indices(separator) {
                    let end = range.start + offset + separator.len();
                    self.collect_pieces(text, start..end, rest, out);
                    start = end;
                }
                if start < range.end {
                    self.collect_pieces(text, start..range.end, rest, out);
                }
            }
            _ => {
                let mut start = range.start;
                let mut count = 0;
                for (offset, _) in slice.char_indices() {
                    if count == self.chunk_size {
                        out.push(start..range.start + offset);
                        start = range.start + offset;
                        count = 0;
                    }
                    count += 1;
                }
                out.push(start..range.end);
            }
        }
    }

    fn merge(&self, text: &str, pieces: &[Range<usize>]) -> Vec<Range<usize>> {
        let lengths: Vec<usize> = pieces.iter().map(|r| char_len(&text[r.clone()])).collect();
        let mut windows = Vec::new();
        let mut first = 0;
        let mut total = 0;

        for (i, &length) in lengths.iter().enumerate() {
            if total + length > self.chunk_size && i > first {
                windows.push(pieces[first].start..pieces[i - 1].end);
                while first < i && (total > self.chunk_overlap || total + length > self.chunk_size) {
                    total -= lengths[first];
                    first += 1;
                }
            }
            total += length;
        }
        if let Some(last) = pieces.last() {
            if first < pieces.len() {
                windows.push(pieces[first].start..last.end);
            }
        }
        windows
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::documents::ArticleDocument;
    use bdn_core::{Article, Source};
    use proptest::prelude::*;

    fn assert_tiles(text: &str, windows: &[Window], chunk_size: usize) {
        let total = char_len(text);
        assert_eq!(windows[0].start, 0);
        let mut covered_to = 0;
        for window in windows {
            let length = char_len(&window.text);
            assert!(length <= chunk_size, "window of {} chars", length);
            assert!(window.start <= covered_to, "gap before offset {}", window.start);
            let expected: String = text.chars().skip(window.start).take(length).collect();
            assert_eq!(window.text, expected);
            covered_to = covered_to.max(window.start + length);
        }
        assert_eq!(covered_to, total);
    }

    #[test]
    fn test_short_text_is_one_window() {
        let splitter = RecursiveSplitter::new(1000, 200);
        let windows = splitter.split_text("A short article.");
        assert_eq!(windows, vec![Window { start: 0, text: "A short article.".to_string() }]);
        assert!(splitter.split_text("").is_empty());
    }

    #[test]
    fn test_2400_char_body_overlaps_without_gaps() {
        let body = "word ".repeat(480);
        assert_eq!(body.len(), 2400);

        let splitter = RecursiveSplitter::new(1000, 200);
        let windows = splitter.split_text(&body);

        assert!(windows.len() >= 3);
        assert_tiles(&body, &windows, 1000);
        for pair in windows.windows(2) {
            let previous_end = pair[0].start + char_len(&pair[0].text);
            assert!(pair[1].start > pair[0].start);
            assert!(pair[1].start < previous_end, "consecutive windows should overlap");
            assert!(previous_end - pair[1].start <= 200);
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let first = "a".repeat(600);
        let second = "b".repeat(600);
        let text = format!("{}\n\n{}", first, second);
        let windows = RecursiveSplitter::new(1000, 200).split_text(&text);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].text, format!("{}\n\n", first));
        assert_eq!(windows[1].text, second);
        assert_tiles(&text, &windows, 1000);
    }

    #[test]
    fn test_unbroken_text_is_cut_by_characters() {
        let text = "ঢ".repeat(2500);
        let windows = RecursiveSplitter::new(1000, 200).split_text(&text);
        assert_eq!(windows.len(), 3);
        assert_tiles(&text, &windows, 1000);
    }

    fn article(title: String, content: String, source: Source) -> Article {
        Article {
            url: format!("https://example.com/{}", title.len()),
            title,
            source,
            date: "2025-01-02".to_string(),
            content,
        }
    }

    proptest! {
        #[test]
        fn prop_windows_tile_text(text in "[a-z .\n]{0,3000}", size in 50usize..400, overlap in 0usize..50) {
            let windows = RecursiveSplitter::new(size, overlap).split_text(&text);
            if text.is_empty() {
                prop_assert!(windows.is_empty());
            } else {
                assert_tiles(&text, &windows, size);
            }
        }

        #[test]
        fn prop_chunks_keep_article_metadata(
            title in "[A-Za-z ]{1,60}",
            content in "[A-Za-z .\n]{0,4000}",
            prothom_alo in any::<bool>(),
        ) {
            let source = if prothom_alo { Source::ProthomAloEnglish } else { Source::DailyStar };
            let article = article(title, content, source);
            let document = ArticleDocument::from(&article);

            let chunks = RecursiveSplitter::new(1000, 200).split_document(&document);
            prop_assert!(!chunks.is_empty());
            for (index, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(&chunk.metadata, &article.metadata());
                prop_assert_eq!(chunk.chunk_index, index);
                prop_assert!(document.text.chars().skip(chunk.start).collect::<String>().starts_with(&chunk.text));
            }
        }
    }
}
