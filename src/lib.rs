pub mod dinushuffle;
pub mod error;
pub mod graph_ops;
pub mod kmer;
pub mod shuffle;
pub mod symbol;

pub use dinushuffle::{run_dinushuffle, Args};
pub use error::{Error, Result};
pub use graph_ops::{Edge, Graph};
pub use shuffle::{dinucleotide_shuffle, shuffle_sequence, ShuffleOutcome, Shuffler};
pub use symbol::{Alphabet, Symbol};
