use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref ACCENT_MAP: HashMap<char, char> = {
        let mut map = HashMap::new();

        for c in ['á', 'à', 'â', 'ä', 'ã'] {
            map.insert(c, 'a');
        }
        for c in ['é', 'è', 'ê', 'ë'] {
            map.insert(c, 'e');
        }
        for c in ['í', 'ì', 'î', 'ï'] {
            map.insert(c, 'i');
        }
        for c in ['ó', 'ò', 'ô', 'ö', 'õ'] {
            map.insert(c, 'o');
        }
        for c in ['ú', 'ù', 'û', 'ü'] {
            map.insert(c, 'u');
        }
        map.insert('ñ', 'n');
        map.insert('ç', 'c');

        map
    };
}

/// A folded view of a source string that remembers where each byte came from.
///
/// Header detection searches the folded view and reports positions in the
/// original OCR text, so every folded byte carries the byte offset of the
/// source character that produced it.
#[derive(Debug, Clone)]
pub struct FoldedText {
    pub text: String,
    offsets: Vec<usize>,
    ends: Vec<usize>,
    source_len: usize,
}

impl FoldedText {
    /// Lowercase only.
    pub fn lowercase(source: &str) -> Self {
        Self::build(source, false, false, false)
    }

    /// Lowercase, accent folding, whitespace collapsed and trimmed.
    pub fn for_matching(source: &str) -> Self {
        Self::build(source, true, true, false)
    }

    /// Same as `for_matching` with every space removed, for OCR output that
    /// merges tokens ("puedecontener").
    pub fn without_spaces(source: &str) -> Self {
        Self::build(source, true, true, true)
    }

    fn build(source: &str, fold_accents: bool, collapse_space: bool, drop_space: bool) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(source.len());
        let mut ends = Vec::with_capacity(source.len());
        let mut pending_space: Option<(usize, usize)> = None;

        for (offset, ch) in source.char_indices() {
            if collapse_space && ch.is_whitespace() {
                if !drop_space && !text.is_empty() && pending_space.is_none() {
                    pending_space = Some((offset, offset + ch.len_utf8()));
                }
                continue;
            }

            if let Some((space_start, space_end)) = pending_space.take() {
                text.push(' ');
                offsets.push(space_start);
                ends.push(space_end);
            }

            for lower in ch.to_lowercase() {
                let folded = if fold_accents {
                    ACCENT_MAP.get(&lower).copied().unwrap_or(lower)
                } else {
                    lower
                };
                let before = text.len();
                text.push(folded);
                let width = text.len() - before;
                offsets.extend(std::iter::repeat(offset).take(width));
                ends.extend(std::iter::repeat(offset + ch.len_utf8()).take(width));
            }
        }

        FoldedText {
            text,
            offsets,
            ends,
            source_len: source.len(),
        }
    }

    /// Byte offset in the source for a byte position in the folded text.
    /// Positions at or past the end map to the end of the source.
    pub fn source_offset(&self, folded_pos: usize) -> usize {
        self.offsets
            .get(folded_pos)
            .copied()
            .unwrap_or(self.source_len)
    }

    /// Source byte range covered by `folded_start..folded_start + len`.
    pub fn source_span(&self, folded_start: usize, len: usize) -> (usize, usize) {
        let start = self.source_offset(folded_start);
        if len == 0 {
            return (start, start);
        }
        let end = self
            .ends
            .get(folded_start + len - 1)
            .copied()
            .unwrap_or(self.source_len);
        (start, end.max(start))
    }
}

/// Lowercase, strip accents and collapse whitespace.
pub fn normalize_for_matching(text: &str) -> String {
    FoldedText::for_matching(text).text
}
