use std::fmt;

use crate::error::{Error, Result};

/// One upper-cased byte of an accepted alphabet.
///
/// Only `Alphabet::parse` hands these out:
///
/// ```compile_fail
/// let _ = dinushuffle::Symbol::new(b'U');
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    /// Wrap a byte without checking it against any alphabet.
    /// Outside the crate, symbols come from `Alphabet::parse`.
    #[inline]
    pub(crate) fn new(byte: u8) -> Self {
        Symbol(byte.to_ascii_uppercase())
    }

    #[inline]
    pub fn byte(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The DNA alphabet used when none is given.
pub const DNA: &str = "ACGT";

/// A finite set of accepted symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Build an alphabet from its letters. Case is normalized, duplicates and
    /// non-ASCII letters are dropped.
    pub fn new(letters: &str) -> Self {
        let mut symbols: Vec<u8> = letters
            .bytes()
            .filter(u8::is_ascii_graphic)
            .map(|b| b.to_ascii_uppercase())
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        Alphabet { symbols }
    }

    pub fn dna() -> Self {
        Alphabet::new(DNA)
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.symbols.binary_search(&byte.to_ascii_uppercase()).is_ok()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Normalize case and check membership in one pass.
    ///
    /// Length is not checked here; graph construction rejects sequences
    /// shorter than two symbols.
    pub fn parse(&self, raw: &[u8]) -> Result<Vec<Symbol>> {
        raw.iter()
            .enumerate()
            .map(|(position, &b)| {
                if self.contains(b) {
                    Ok(Symbol::new(b))
                } else {
                    Err(Error::InvalidAlphabet {
                        symbol: offending_char(&raw[position..]),
                        position,
                        alphabet: self.to_string(),
                    })
                }
            })
            .collect()
    }
}

/// Decode the character starting at the front of `rest`.
///
/// Every byte before it was an ASCII alphabet member, so it starts on a
/// character boundary and its byte position equals its character position.
fn offending_char(rest: &[u8]) -> char {
    String::from_utf8_lossy(rest)
        .chars()
        .next()
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::dna()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.symbols))
    }
}

pub fn symbols_to_string(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.as_char()).collect()
}
