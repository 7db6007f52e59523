//! Word addressing inside a run's text.
//!
//! Text is split on single spaces. A single leading or trailing empty token
//! (from a boundary space) is not a word; it is remembered so the pieces of
//! a split concatenate back to the original text exactly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Words<'a> {
    pub words: Vec<&'a str>,
    leading_space: bool,
    trailing_space: bool,
}

/// Text of the three pieces of a split, any of which may be empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segments {
    pub front: String,
    pub middle: String,
    pub back: String,
}

impl<'a> Words<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut words: Vec<&str> = text.split(' ').collect();
        let mut leading_space = false;
        let mut trailing_space = false;

        if words.len() > 1 && words[0].is_empty() {
            words.remove(0);
            leading_space = true;
        }
        if words.len() > 1 && words[words.len() - 1].is_empty() {
            words.pop();
            trailing_space = true;
        }

        Self {
            words,
            leading_space,
            trailing_space,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Translate `(count_from_end, count)` into a clamped `start..end` range.
    ///
    /// `count_from_end` counts the words from the range start to the end of
    /// the run, inclusive; values past the start are clamped to the first
    /// word and `count` is clamped to the words that remain.
    pub fn range(&self, count_from_end: usize, count: usize) -> std::ops::Range<usize> {
        let start = self.len().saturating_sub(count_from_end);
        let end = start.saturating_add(count).min(self.len());
        start..end
    }

    /// Cut the text around `range`.
    ///
    /// The separator before the range stays with the front piece and the
    /// separator after it moves to the back piece, so the middle holds
    /// exactly the targeted words. Front + middle + back is always the
    /// original text.
    pub(crate) fn segments(&self, range: std::ops::Range<usize>) -> Segments {
        let (start, end) = (range.start, range.end);
        let at_start = start == 0;
        let at_end = end == self.len();

        let mut front = String::new();
        if !at_start {
            if self.leading_space {
                front.push(' ');
            }
            front.push_str(&self.words[..start].join(" "));
            front.push(' ');
        }

        let mut middle = String::new();
        if at_start && self.leading_space {
            middle.push(' ');
        }
        middle.push_str(&self.words[start..end].join(" "));
        if at_end && self.trailing_space {
            middle.push(' ');
        }

        let mut back = String::new();
        if !at_end {
            back.push(' ');
            back.push_str(&self.words[end..].join(" "));
            if self.trailing_space {
                back.push(' ');
            }
        }

        Segments {
            front,
            middle,
            back,
        }
    }
}

impl Segments {
    /// Fold whitespace-only outer pieces into the middle so no piece that
    /// becomes a run is blank.
    pub(crate) fn absorb_blank_edges(mut self) -> Self {
        if !self.front.is_empty() && self.front.trim().is_empty() {
            self.middle.insert_str(0, &self.front);
            self.front.clear();
        }
        if !self.back.is_empty() && self.back.trim().is_empty() {
            self.middle.push_str(&self.back);
            self.back.clear();
        }
        self
    }
}
