use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::graph_ops::Graph;
use crate::kmer::{dinucleotide_table, same_dinucleotide_profile};
use crate::shuffle::Shuffler;
use crate::symbol::{symbols_to_string, Alphabet, DNA};

#[derive(Parser, Debug, Clone)]
#[command(name = "dinushuffle", version, about = "Dinucleotide-preserving sequence shuffling")]
pub struct Args {
    /// Input FASTA file
    #[arg(short, long)]
    pub sequences: String,

    /// Output FASTA file ('-' for stdout)
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Shuffled copies to emit per input record
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give up on a shuffle after this many terminal edge selections
    #[arg(long = "max-attempts")]
    pub max_attempts: Option<usize>,

    /// Accepted symbols (case-insensitive)
    #[arg(short, long, default_value = DNA)]
    pub alphabet: String,

    /// Write a JSON summary of every record to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShuffleReport {
    pub id: String,
    pub attempts: usize,
    pub verified: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordReport {
    pub id: String,
    pub length: usize,
    pub dinucleotides: BTreeMap<String, usize>,
    pub shuffles: Vec<ShuffleReport>,
}

pub fn load_sequences(file_path: &str) -> Result<Vec<Sequence>> {
    let file = File::open(file_path)?;
    read_sequences(BufReader::new(file))
}

pub fn read_sequences<R: BufRead>(reader: R) -> Result<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_data = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                sequences.push(Sequence {
                    id,
                    data: std::mem::take(&mut current_data),
                });
            }
            // Only the first word of the header is the ID
            current_id = Some(header.split_whitespace().next().unwrap_or("").to_string());
        } else {
            current_data.extend(line.trim().bytes());
        }
    }

    if let Some(id) = current_id {
        sequences.push(Sequence {
            id,
            data: current_data,
        });
    }

    Ok(sequences)
}

pub fn write_fasta<W: Write>(writer: &mut W, records: &[Sequence]) -> io::Result<()> {
    for record in records {
        writeln!(writer, ">{}", record.id)?;
        writer.write_all(&record.data)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Shuffle every record `count` times, returning the shuffled records and a per-record report.
pub fn shuffle_records(
    sequences: &[Sequence],
    alphabet: &Alphabet,
    shuffler: &Shuffler,
    count: usize,
    rng: &mut StdRng,
) -> Result<(Vec<Sequence>, Vec<RecordReport>)> {
    let mut shuffled = Vec::with_capacity(sequences.len() * count);
    let mut reports = Vec::with_capacity(sequences.len());

    for seq in sequences {
        let in_record = |source: Error| Error::Record {
            id: seq.id.clone(),
            source: Box::new(source),
        };

        let symbols = alphabet.parse(&seq.data).map_err(in_record)?;
        let graph = Graph::build(&symbols).map_err(in_record)?;
        let outcomes = shuffler
            .shuffle_many(&graph, count, rng)
            .map_err(in_record)?;

        let mut shuffle_reports = Vec::with_capacity(count);
        for (k, outcome) in outcomes.into_iter().enumerate() {
            let id = format!("{}_shuf{}", seq.id, k + 1);
            let verified = same_dinucleotide_profile(&symbols, &outcome.sequence);
            if !verified {
                warn!(record = %id, "shuffled sequence does not match input dinucleotide profile");
            }
            shuffle_reports.push(ShuffleReport {
                id: id.clone(),
                attempts: outcome.attempts,
                verified,
            });
            shuffled.push(Sequence {
                id,
                data: symbols_to_string(&outcome.sequence).into_bytes(),
            });
        }

        info!(
            record = %seq.id,
            length = symbols.len(),
            shuffles = count,
            "shuffled record"
        );

        reports.push(RecordReport {
            id: seq.id.clone(),
            length: symbols.len(),
            dinucleotides: dinucleotide_table(&symbols),
            shuffles: shuffle_reports,
        });
    }

    Ok((shuffled, reports))
}

pub fn run_dinushuffle(args: Args) -> Result<()> {
    let sequences = load_sequences(&args.sequences)?;
    info!(count = sequences.len(), path = %args.sequences, "loaded sequences");

    let alphabet = Alphabet::new(&args.alphabet);
    let shuffler = Shuffler {
        max_attempts: args.max_attempts,
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (shuffled, reports) =
        shuffle_records(&sequences, &alphabet, &shuffler, args.count, &mut rng)?;

    if args.output == "-" {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        write_fasta(&mut writer, &shuffled)?;
        writer.flush()?;
    } else {
        let mut writer = BufWriter::new(File::create(&args.output)?);
        write_fasta(&mut writer, &shuffled)?;
        writer.flush()?;
        info!(path = %args.output, records = shuffled.len(), "shuffled sequences written");
    }

    if let Some(report_path) = &args.report {
        let writer = BufWriter::new(File::create(report_path)?);
        serde_json::to_writer_pretty(writer, &reports)?;
        info!(path = %report_path, "report written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sequences_multiline() {
        let fasta = ">seq1 some description\nACGT\nacgt\n>seq2\nAC\n";
        let seqs = read_sequences(fasta.as_bytes()).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].id, "seq1");
        assert_eq!(seqs[0].data, b"ACGTacgt".to_vec());
        assert_eq!(seqs[1].data, b"AC".to_vec());
    }

    #[test]
    fn test_shuffle_records_names_and_reports() {
        let seqs = vec![Sequence {
            id: "r".to_string(),
            data: b"acaggattcagattagcccggaaatttaac".to_vec(),
        }];
        let mut rng = StdRng::seed_from_u64(4);
        let (out, reports) =
            shuffle_records(&seqs, &Alphabet::dna(), &Shuffler::new(), 3, &mut rng).unwrap();

        let ids: Vec<_> = out.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["r_shuf1", "r_shuf2", "r_shuf3"]);
        assert!(out.iter().all(|s| s.data.len() == 30 && s.data[0] == b'A'));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].length, 30);
        assert!(reports[0].shuffles.iter().all(|s| s.verified && s.attempts >= 1));
    }

    #[test]
    fn test_shuffle_records_reports_offending_record() {
        let seqs = vec![
            Sequence {
                id: "good".to_string(),
                data: b"ACGT".to_vec(),
            },
            Sequence {
                id: "rna".to_string(),
                data: b"ACGU".to_vec(),
            },
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let err = shuffle_records(&seqs, &Alphabet::dna(), &Shuffler::new(), 1, &mut rng)
            .unwrap_err();
        match err {
            Error::Record { id, source } => {
                assert_eq!(id, "rna");
                assert!(matches!(*source, Error::InvalidAlphabet { symbol: 'U', position: 3, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_fasta() {
        let mut buf = Vec::new();
        write_fasta(
            &mut buf,
            &[Sequence {
                id: "x".to_string(),
                data: b"ACGT".to_vec(),
            }],
        )
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), ">x\nACGT\n");
    }
}
