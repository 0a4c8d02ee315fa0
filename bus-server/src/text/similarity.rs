//! Approximate string similarity.
//!
//! Implements the longest-matching-blocks ratio (Ratcliff/Obershelp):
//! repeatedly find the longest common run, recurse on both sides of it, and
//! score `2 * matched / (len(a) + len(b))`. Characters for which the junk
//! predicate holds never anchor a match but may extend one.

use std::collections::HashMap;

/// Words ignored when anchoring matches between stop names.
///
/// Matching works character by character, so of these only the space can
/// ever equal a single element.
pub const STOP_WORDS: &[&str] = &["do", "da", "das", "dos", "de", " "];

/// Junk predicate for stop names.
pub fn is_stop_word_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    let s: &str = c.encode_utf8(&mut buf);
    STOP_WORDS.contains(&s)
}

/// A matching block: `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    len: usize,
}

/// Sequence matcher over the characters of two strings.
pub struct SequenceMatcher<J: Fn(char) -> bool> {
    a: Vec<char>,
    b: Vec<char>,
    /// Positions in `b` of every non-junk character.
    b2j: HashMap<char, Vec<usize>>,
    is_junk: J,
}

impl<J: Fn(char) -> bool> SequenceMatcher<J> {
    /// Build a matcher comparing `a` against `b`.
    pub fn new(a: &str, b: &str, is_junk: J) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            if !is_junk(c) {
                b2j.entry(c).or_default().push(j);
            }
        }

        Self { a, b, b2j, is_junk }
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            j2len = next;
        }

        // Extend with junk on both ends; junk may pad but never anchor.
        while best_i > alo
            && best_j > blo
            && (self.is_junk)(self.b[best_j - 1])
            && self.a[best_i - 1] == self.b[best_j - 1]
        {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && (self.is_junk)(self.b[best_j + best_len])
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }

        Block {
            a_start: best_i,
            b_start: best_j,
            len: best_len,
        }
    }

    /// Total number of characters in all matching blocks.
    pub fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            total += block.len;
            if alo < block.a_start && blo < block.b_start {
                pending.push((alo, block.a_start, blo, block.b_start));
            }
            let (a_end, b_end) = (block.a_start + block.len, block.b_start + block.len);
            if a_end < ahi && b_end < bhi {
                pending.push((a_end, ahi, b_end, bhi));
            }
        }

        total
    }

    /// Similarity in `[0, 1]`. Two empty strings are identical.
    pub fn ratio(&self) -> f64 {
        let len = self.a.len() + self.b.len();
        if len == 0 {
            return 1.0;
        }
        2.0 * self.matched_len() as f64 / len as f64
    }
}

/// Similarity ratio between two stop names, ignoring stop-word characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b, is_stop_word_char).ratio()
}
