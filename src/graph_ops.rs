use std::collections::{BTreeMap, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::symbol::{Alphabet, Symbol};

/// One observed adjacency `from -> to` in the source sequence.
///
/// Equal pairs at different positions are distinct edges in the graph but
/// compare equal, so removal is by value.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Edge {
    pub from: Symbol,
    pub to: Symbol,
}

impl Edge {
    pub fn new(from: Symbol, to: Symbol) -> Self {
        Edge { from, to }
    }
}

/// Directed multigraph over symbols, one outgoing edge list per symbol.
///
/// Walking the lists from `start`, always taking the first remaining edge,
/// spells the sequence the graph was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    start: Symbol,
    end: Symbol,
    length: usize,
    adjacency: BTreeMap<Symbol, VecDeque<Edge>>,
}

impl Graph {
    /// Build the graph of a validated symbol sequence.
    pub fn build(sequence: &[Symbol]) -> Result<Self> {
        if sequence.len() < 2 {
            return Err(Error::TooShort {
                length: sequence.len(),
            });
        }

        let mut adjacency: BTreeMap<Symbol, VecDeque<Edge>> = BTreeMap::new();
        for pair in sequence.windows(2) {
            adjacency
                .entry(pair[0])
                .or_insert_with(VecDeque::new)
                .push_back(Edge::new(pair[0], pair[1]));
        }

        Ok(Graph {
            start: sequence[0],
            end: sequence[sequence.len() - 1],
            length: sequence.len(),
            adjacency,
        })
    }

    /// Parse raw text against `alphabet` and build its graph.
    pub fn from_text(text: &str, alphabet: &Alphabet) -> Result<Self> {
        let symbols = alphabet.parse(text.as_bytes())?;
        Graph::build(&symbols)
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    pub fn end(&self) -> Symbol {
        self.end
    }

    /// Number of symbols in the source sequence.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|edges| edges.len()).sum()
    }

    /// Symbols with at least one outgoing edge, in symbol order.
    pub fn nodes(&self) -> Vec<Symbol> {
        self.adjacency
            .iter()
            .filter(|(_, edges)| !edges.is_empty())
            .map(|(&symbol, _)| symbol)
            .collect()
    }

    pub fn edges_from(&self, symbol: Symbol) -> Result<&VecDeque<Edge>> {
        self.adjacency
            .get(&symbol)
            .filter(|edges| !edges.is_empty())
            .ok_or(Error::UnknownSymbol(symbol))
    }

    /// Remove the first edge equal to `edge` from its source's list.
    pub fn remove_first_matching(&mut self, edge: Edge) -> Result<()> {
        let not_found = Error::EdgeNotFound {
            from: edge.from,
            to: edge.to,
        };
        let edges = self.adjacency.get_mut(&edge.from).ok_or(not_found)?;
        match edges.iter().position(|e| *e == edge) {
            Some(index) => {
                edges.remove(index);
                Ok(())
            }
            None => Err(Error::EdgeNotFound {
                from: edge.from,
                to: edge.to,
            }),
        }
    }

    pub fn append(&mut self, edge: Edge) {
        self.adjacency
            .entry(edge.from)
            .or_insert_with(VecDeque::new)
            .push_back(edge);
    }

    /// Permute each adjacency list in place. Edges never move between lists.
    pub fn shuffle_each_adjacency_list<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for edges in self.adjacency.values_mut() {
            edges.make_contiguous().shuffle(rng);
        }
    }

    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Walk from `start`, popping the first edge of the current node each step.
    ///
    /// Consumes the edges it walks. Fails with `Disconnected` if a node runs
    /// dry before `len() - 1` steps or the walk stops somewhere other than `end`.
    pub fn reconstruct_sequence(&mut self) -> Result<Vec<Symbol>> {
        let mut sequence = Vec::with_capacity(self.length);
        let mut current = self.start;
        sequence.push(current);

        for step in 1..self.length {
            let next = self
                .adjacency
                .get_mut(&current)
                .and_then(|edges| edges.pop_front())
                .ok_or(Error::Disconnected {
                    step,
                    node: current,
                })?;
            sequence.push(next.to);
            current = next.to;
        }

        if current != self.end {
            return Err(Error::Disconnected {
                step: self.length,
                node: current,
            });
        }
        Ok(sequence)
    }

    /// Reconstruct from a private copy, leaving `self` intact.
    pub fn to_sequence(&self) -> Result<Vec<Symbol>> {
        self.deep_copy().reconstruct_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::symbols_to_string;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sym(c: char) -> Symbol {
        Symbol::new(c as u8)
    }

    fn graph(text: &str) -> Graph {
        Graph::from_text(text, &Alphabet::dna()).unwrap()
    }

    #[test]
    fn test_build_records_endpoints() {
        let g = graph("ACAGGT");
        assert_eq!(g.start(), sym('A'));
        assert_eq!(g.end(), sym('T'));
        assert_eq!(g.len(), 6);
        assert_eq!(g.edge_count(), 5);
    }

    #[test]
    fn test_build_keeps_duplicate_edges() {
        let g = graph("AAAAC");
        let from_a: Vec<_> = g.edges_from(sym('A')).unwrap().iter().copied().collect();
        assert_eq!(
            from_a,
            vec![
                Edge::new(sym('A'), sym('A')),
                Edge::new(sym('A'), sym('A')),
                Edge::new(sym('A'), sym('A')),
                Edge::new(sym('A'), sym('C')),
            ]
        );
    }

    #[test]
    fn test_nodes_exclude_pure_terminator() {
        let g = graph("ACGT");
        assert_eq!(g.nodes(), vec![sym('A'), sym('C'), sym('G')]);
        assert!(matches!(
            g.edges_from(sym('T')),
            Err(Error::UnknownSymbol(s)) if s == sym('T')
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            Graph::from_text("A", &Alphabet::dna()),
            Err(Error::TooShort { length: 1 })
        ));
        assert!(matches!(
            Graph::from_text("", &Alphabet::dna()),
            Err(Error::TooShort { length: 0 })
        ));
    }

    #[test]
    fn test_reconstruct_original_order() {
        let text = "ACAGGATTCAGATTAGCCCGGAAATTTAAC";
        let mut g = graph(text);
        let rebuilt = g.reconstruct_sequence().unwrap();
        assert_eq!(symbols_to_string(&rebuilt), text);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_to_sequence_leaves_graph_intact() {
        let g = graph("GATTACA");
        let before = g.clone();
        assert_eq!(symbols_to_string(&g.to_sequence().unwrap()), "GATTACA");
        assert_eq!(g, before);
    }

    #[test]
    fn test_removed_edge_disconnects() {
        let mut g = graph("ACGT");
        g.remove_first_matching(Edge::new(sym('A'), sym('C'))).unwrap();
        assert!(matches!(
            g.reconstruct_sequence(),
            Err(Error::Disconnected { step: 1, .. })
        ));
    }

    #[test]
    fn test_walk_ending_off_end_is_disconnected() {
        // "ACA": swap C->A for C->G so every step succeeds but the walk stops on G.
        let mut g = graph("ACA");
        g.remove_first_matching(Edge::new(sym('C'), sym('A'))).unwrap();
        g.append(Edge::new(sym('C'), sym('G')));
        match g.reconstruct_sequence() {
            Err(Error::Disconnected { step, node }) => {
                assert_eq!(step, 3);
                assert_eq!(node, sym('G'));
            }
            other => panic!("expected disconnected walk, got {:?}", other),
        }
    }

    #[test]
    fn test_remove_missing_edge() {
        let mut g = graph("ACGT");
        let err = g.remove_first_matching(Edge::new(sym('C'), sym('A'))).unwrap_err();
        assert!(matches!(err, Error::EdgeNotFound { .. }));
        assert!(matches!(
            g.remove_first_matching(Edge::new(sym('T'), sym('A'))),
            Err(Error::EdgeNotFound { .. })
        ));
        assert_eq!(symbols_to_string(&g.to_sequence().unwrap()), "ACGT");
    }

    #[test]
    fn test_remove_then_append_moves_edge_last() {
        let mut g = graph("ACAGAT");
        let ac = Edge::new(sym('A'), sym('C'));
        g.remove_first_matching(ac).unwrap();
        g.append(ac);
        let order: Vec<_> = g.edges_from(sym('A')).unwrap().iter().map(|e| e.to).collect();
        assert_eq!(order, vec![sym('G'), sym('T'), sym('C')]);
    }

    #[test]
    fn test_shuffle_preserves_out_degree() {
        let mut g = graph("AAAACCCCGGGGTTTTACGTACGT");
        let before: Vec<_> = g
            .nodes()
            .into_iter()
            .map(|n| {
                let mut tos: Vec<_> = g.edges_from(n).unwrap().iter().map(|e| e.to).collect();
                tos.sort();
                (n, tos)
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        g.shuffle_each_adjacency_list(&mut rng);

        for (node, expected) in before {
            let edges = g.edges_from(node).unwrap();
            assert!(edges.iter().all(|e| e.from == node));
            let mut tos: Vec<_> = edges.iter().map(|e| e.to).collect();
            tos.sort();
            assert_eq!(tos, expected);
        }
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let g = graph("ACGTACGT");
        let mut copy = g.deep_copy();
        copy.reconstruct_sequence().unwrap();
        assert_eq!(copy.edge_count(), 0);
        assert_eq!(g.edge_count(), 7);
    }
}
