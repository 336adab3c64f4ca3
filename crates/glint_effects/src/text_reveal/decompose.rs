//! Splitting text into per-letter animatable units
//!
//! After decomposition an element's children are, per word, a `span.word`
//! holding one `span.letter` per character plus a trailing non-breaking
//! space letter, with plain `" "` text nodes between words:
//!
//! ```text
//! <p>
//!   <span class="word">
//!     <span class="letter">H</span> ... <span class="letter">&nbsp;</span>
//!   </span>
//!   " "
//!   <span class="word"> ... </span>
//! </p>
//! ```
//!
//! Every letter starts at opacity 0.

use glint_core::{Display, Document, DomError, NodeId, Selector, StyleProperty};

pub const WORD_CLASS: &str = "word";
pub const LETTER_CLASS: &str = "letter";

/// Glyph of the trailing letter appended to every word
pub const PLACEHOLDER: char = '\u{a0}';

/// Split `text` into words of characters
///
/// Runs of whitespace separate words; leading and trailing whitespace is
/// dropped. Empty or whitespace-only text yields no words.
pub fn split_words(text: &str) -> Vec<Vec<char>> {
    text.split_whitespace()
        .map(|word| word.chars().collect())
        .collect()
}

/// `text` with whitespace runs collapsed to single spaces and trimmed
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Letter {
    pub node: NodeId,
    pub glyph: char,
    pub is_placeholder: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    pub node: NodeId,
    /// Letters in source order, ending with the placeholder
    pub letters: Vec<Letter>,
}

impl Word {
    /// Letters excluding the placeholder
    pub fn glyphs(&self) -> impl Iterator<Item = &Letter> + '_ {
        self.letters.iter().filter(|l| !l.is_placeholder)
    }

    pub fn text(&self) -> String {
        self.glyphs().map(|l| l.glyph).collect()
    }

    pub fn placeholder(&self) -> Option<&Letter> {
        self.letters.last().filter(|l| l.is_placeholder)
    }

    pub fn letter_nodes(&self) -> Vec<NodeId> {
        self.letters.iter().map(|l| l.node).collect()
    }
}

/// Reassemble the visible text of `words`, one space between words
pub fn join_words(words: &[Word]) -> String {
    words.iter().map(Word::text).collect::<Vec<_>>().join(" ")
}

/// Replace the children of `element` with the word/letter structure of
/// `text`
pub fn decompose(document: &mut Document, element: NodeId, text: &str) -> Result<Vec<Word>, DomError> {
    document.remove_children(element)?;
    let split = split_words(text);
    let mut words = Vec::with_capacity(split.len());

    for (index, chars) in split.into_iter().enumerate() {
        if index > 0 {
            let space = document.create_text(" ");
            document.append_child(element, space)?;
        }

        let word = document.create_element("span");
        document.add_class(word, WORD_CLASS)?;
        document.append_child(element, word)?;

        let mut letters = Vec::with_capacity(chars.len() + 1);
        for glyph in chars {
            letters.push(create_letter(document, word, glyph, false)?);
        }
        letters.push(create_letter(document, word, PLACEHOLDER, true)?);

        words.push(Word {
            node: word,
            letters,
        });
    }

    tracing::trace!("decomposed {:?} into {} word(s)", element, words.len());
    Ok(words)
}

fn create_letter(
    document: &mut Document,
    word: NodeId,
    glyph: char,
    is_placeholder: bool,
) -> Result<Letter, DomError> {
    let node = document.create_element("span");
    document.add_class(node, LETTER_CLASS)?;
    let style = document.style_mut(node)?;
    style.display = Display::InlineBlock;
    style.set(StyleProperty::Opacity, 0.0);
    document.set_text_content(node, &glyph.to_string())?;
    document.append_child(word, node)?;
    Ok(Letter {
        node,
        glyph,
        is_placeholder,
    })
}

/// Word and letter nodes currently under `element`, in document order
///
/// Reads the live tree rather than a cached decomposition.
pub fn query_letters(document: &Document, element: NodeId) -> Vec<Vec<NodeId>> {
    let letter = Selector::class(LETTER_CLASS);
    document
        .query_all_within(element, &Selector::class(WORD_CLASS))
        .into_iter()
        .map(|word| document.query_all_within(word, &letter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words("Hello world"),
            vec![vec!['H', 'e', 'l', 'l', 'o'], vec!['w', 'o', 'r', 'l', 'd']]
        );
        assert_eq!(split_words("  a \n\t b  ").len(), 2);
        assert!(split_words("").is_empty());
        assert!(split_words(" \n\t ").is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Make \n  it\tshine "), "Make it shine");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_decompose_structure() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();

        let words = decompose(&mut doc, p, "Hello world").unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].letters.len(), 6);
        assert_eq!(words[1].letters.len(), 6);
        assert_eq!(words[0].text(), "Hello");
        assert_eq!(words[1].placeholder().map(|l| l.glyph), Some(PLACEHOLDER));

        // word, " ", word
        let children = doc.children(p).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], words[0].node);
        assert_eq!(doc.node(children[1]).unwrap().as_text(), Some(" "));
        assert_eq!(children[2], words[1].node);

        for word in &words {
            assert!(doc.has_class(word.node, WORD_CLASS));
            assert_eq!(doc.children(word.node), word.letter_nodes().as_slice());
            for letter in &word.letters {
                assert!(doc.has_class(letter.node, LETTER_CLASS));
                let style = doc.style(letter.node).unwrap();
                assert_eq!(style.opacity(), 0.0);
                assert_eq!(style.display, Display::InlineBlock);
                assert_eq!(doc.text_content(letter.node), letter.glyph.to_string());
            }
        }
    }

    #[test]
    fn test_decompose_reproduces_collapsed_text() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let source = "  Build   something\n people\tremember  ";

        let words = decompose(&mut doc, p, source).unwrap();
        assert_eq!(words.len(), source.split_whitespace().count());
        assert_eq!(join_words(&words), collapse_whitespace(source));
    }

    #[test]
    fn test_decompose_unicode() {
        let mut doc = Document::new();
        let p = doc.create_element("p");

        let words = decompose(&mut doc, p, "naïve café").unwrap();
        assert_eq!(words[0].glyphs().count(), 5);
        assert_eq!(join_words(&words), "naïve café");
    }

    #[test]
    fn test_decompose_empty_text() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_text_content(p, "   ").unwrap();

        let words = decompose(&mut doc, p, "   ").unwrap();
        assert!(words.is_empty());
        assert!(doc.children(p).is_empty());
        assert!(query_letters(&doc, p).is_empty());
    }

    #[test]
    fn test_decompose_replaces_children() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_text_content(p, "old text").unwrap();

        decompose(&mut doc, p, "new").unwrap();
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), format!("new{PLACEHOLDER}"));
    }

    #[test]
    fn test_query_letters_reads_tree() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let words = decompose(&mut doc, p, "ab cde").unwrap();

        let queried = query_letters(&doc, p);
        assert_eq!(queried.len(), 2);
        assert_eq!(queried[0], words[0].letter_nodes());
        assert_eq!(queried[1], words[1].letter_nodes());
    }

    #[test]
    fn test_decompose_not_an_element() {
        let mut doc = Document::new();
        let text = doc.create_text("hi");
        assert!(decompose(&mut doc, text, "hi").is_err());
    }
}
