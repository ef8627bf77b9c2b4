use std::collections::BTreeMap;

use rand::{thread_rng, Rng};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph_ops::{Edge, Graph};
use crate::symbol::{symbols_to_string, Alphabet, Symbol};

/// Attempt count after which a single shuffle logs a warning.
const SLOW_SEARCH_ATTEMPTS: usize = 10_000;

/// Result of one shuffle along with how many selections were drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleOutcome {
    pub sequence: Vec<Symbol>,
    pub attempts: usize,
}

/// Altschul-Erickson dinucleotide shuffle driver.
///
/// The canonical graph is only read; every call mutates its own copy.
#[derive(Clone, Debug, Default)]
pub struct Shuffler {
    /// Upper bound on terminal edge selections per shuffle. `None` retries forever.
    pub max_attempts: Option<usize>,
}

impl Shuffler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Shuffler {
            max_attempts: Some(max_attempts),
        }
    }

    /// Choose one outgoing edge uniformly at random for every node except `end`.
    pub fn pick_terminal_edges<R: Rng + ?Sized>(graph: &Graph, rng: &mut R) -> Result<Vec<Edge>> {
        let end = graph.end();
        let mut terminal = Vec::new();
        for node in graph.nodes() {
            if node == end {
                continue;
            }
            let edges = graph.edges_from(node)?;
            let index = rng.gen_range(0..edges.len());
            terminal.push(edges[index]);
        }
        Ok(terminal)
    }

    /// Check that following the chosen edges from any node leads to `end`.
    ///
    /// Flags propagate backwards from `end` one pass at a time; a chain of
    /// `terminal.len()` hops is the longest an acyclic selection can form.
    pub fn is_connected_to_end(graph: &Graph, terminal: &[Edge]) -> bool {
        let mut reaches_end: BTreeMap<Symbol, bool> =
            graph.nodes().into_iter().map(|node| (node, false)).collect();
        reaches_end.insert(graph.end(), true);

        let passes = terminal.len().max(1);
        for _ in 0..passes {
            if reaches_end.values().all(|&flag| flag) {
                return true;
            }
            for edge in terminal {
                if reaches_end.get(&edge.to).copied().unwrap_or(false) {
                    reaches_end.insert(edge.from, true);
                }
            }
        }
        reaches_end.values().all(|&flag| flag)
    }

    /// Draw selections until one routes every node to `end`.
    fn select_terminal_edges<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        rng: &mut R,
    ) -> Result<(Vec<Edge>, usize)> {
        let mut attempts = 0;
        loop {
            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    return Err(Error::ShuffleTimeout { attempts });
                }
            }
            attempts += 1;

            let terminal = Self::pick_terminal_edges(graph, rng)?;
            if Self::is_connected_to_end(graph, &terminal) {
                debug!(attempts, "accepted terminal edge selection");
                return Ok((terminal, attempts));
            }

            if attempts == SLOW_SEARCH_ATTEMPTS {
                warn!(
                    attempts,
                    nodes = graph.nodes().len(),
                    "terminal edge search is taking unusually long; check graph construction"
                );
            }
        }
    }

    /// Shuffle and report the number of selections it took.
    pub fn shuffle_with_stats<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        rng: &mut R,
    ) -> Result<ShuffleOutcome> {
        let (terminal, attempts) = self.select_terminal_edges(graph, rng)?;

        let mut working = graph.deep_copy();
        for &edge in &terminal {
            working.remove_first_matching(edge)?;
        }
        working.shuffle_each_adjacency_list(rng);
        for &edge in &terminal {
            working.append(edge);
        }

        let sequence = working.reconstruct_sequence()?;
        Ok(ShuffleOutcome { sequence, attempts })
    }

    /// Produce a random sequence with the same pair counts and endpoints as `graph`'s source.
    pub fn shuffle<R: Rng + ?Sized>(&self, graph: &Graph, rng: &mut R) -> Result<Vec<Symbol>> {
        self.shuffle_with_stats(graph, rng).map(|outcome| outcome.sequence)
    }

    /// Shuffle with the thread-local generator.
    pub fn shuffle_default(&self, graph: &Graph) -> Result<Vec<Symbol>> {
        self.shuffle(graph, &mut thread_rng())
    }

    /// `count` independent shuffles of one canonical graph.
    pub fn shuffle_many<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<ShuffleOutcome>> {
        (0..count)
            .map(|_| self.shuffle_with_stats(graph, rng))
            .collect()
    }
}

/// Shuffle a DNA string in one call. Lower-case input is accepted.
pub fn dinucleotide_shuffle<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Result<String> {
    let graph = Graph::from_text(text, &Alphabet::dna())?;
    let shuffled = Shuffler::new().shuffle(&graph, rng)?;
    Ok(symbols_to_string(&shuffled))
}

/// Like `dinucleotide_shuffle`, drawing from the thread-local generator.
pub fn shuffle_sequence(text: &str) -> Result<String> {
    dinucleotide_shuffle(text, &mut thread_rng())
}
