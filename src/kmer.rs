use std::collections::BTreeMap;

use crate::symbol::Symbol;

/// Count every adjacent pair in `sequence`.
pub fn dinucleotide_counts(sequence: &[Symbol]) -> BTreeMap<(Symbol, Symbol), usize> {
    let mut counts = BTreeMap::new();
    for pair in sequence.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

/// Same counts keyed by the two-letter string, e.g. `"AC"`.
pub fn dinucleotide_table(sequence: &[Symbol]) -> BTreeMap<String, usize> {
    dinucleotide_counts(sequence)
        .into_iter()
        .map(|((a, b), n)| (format!("{}{}", a, b), n))
        .collect()
}

/// True when both sequences share length, first and last symbol, and pair counts.
pub fn same_dinucleotide_profile(a: &[Symbol], b: &[Symbol]) -> bool {
    a.len() == b.len()
        && a.first() == b.first()
        && a.last() == b.last()
        && dinucleotide_counts(a) == dinucleotide_counts(b)
}
