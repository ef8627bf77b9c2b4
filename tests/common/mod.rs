use dinushuffle::dinushuffle::Args;
use std::io::Write;
use tempfile::NamedTempFile;

/// Create default Args for testing
pub fn default_test_args(sequences: String, output: String) -> Args {
    Args {
        sequences,
        output,
        count: 1,
        seed: Some(42),
        max_attempts: None,
        alphabet: "ACGT".to_string(),
        report: None,
        verbose: false,
    }
}

pub fn create_test_fasta(sequences: &[(&str, &str)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for (id, seq) in sequences {
        writeln!(file, ">{}", id).unwrap();
        writeln!(file, "{}", seq).unwrap();
    }
    file.flush().unwrap();
    file
}
