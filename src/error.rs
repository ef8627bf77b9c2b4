use crate::symbol::Symbol;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("symbol '{symbol}' at position {position} is not in alphabet {alphabet}")]
    InvalidAlphabet {
        symbol: char,
        position: usize,
        alphabet: String,
    },
    #[error("sequence of length {length} is too short to shuffle (need at least 2 symbols)")]
    TooShort { length: usize },
    #[error("symbol '{0}' has no outgoing edges")]
    UnknownSymbol(Symbol),
    /// Bookkeeping defect: the shuffler tried to remove an edge it had sampled from the graph.
    #[error("edge {from}->{to} not found in adjacency list")]
    EdgeNotFound { from: Symbol, to: Symbol },
    #[error("traversal stuck at node '{node}' after {step} symbols")]
    Disconnected { step: usize, node: Symbol },
    #[error("no valid terminal edge selection found after {attempts} attempts")]
    ShuffleTimeout { attempts: usize },
    #[error("record {id}: {source}")]
    Record {
        id: String,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
