//! Record sources feeding the submission session.
//!
//! A source yields ordered bets until exhausted. The session owns batching;
//! sources only produce one record at a time.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::error::{Result, TombolaError};
use crate::protocol::Bet;

/// Number of fields per source record.
const RECORD_FIELDS: usize = 5;

/// An ordered source of bet records.
pub trait BetSource {
    /// Yield the next bet, or `None` once the source is exhausted.
    fn next_bet(&mut self) -> impl std::future::Future<Output = Result<Option<Bet>>> + Send;
}

/// Bet source reading a comma-delimited file, one record per line, fields in
/// order: name, surname, document, birth date, number.
///
/// Malformed lines are an error, never silently skipped.
pub struct CsvBetSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl CsvBetSource {
    /// Open the file at `path` for reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    fn parse_line(&self, line: &str) -> Result<Bet> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != RECORD_FIELDS {
            return Err(TombolaError::Config(format!(
                "Line {}: expected {} fields, found {}",
                self.line_no,
                RECORD_FIELDS,
                fields.len()
            )));
        }
        Ok(Bet::from_record([
            fields[0].to_string(),
            fields[1].to_string(),
            fields[2].to_string(),
            fields[3].to_string(),
            fields[4].to_string(),
        ]))
    }
}

impl BetSource for CsvBetSource {
    async fn next_bet(&mut self) -> Result<Option<Bet>> {
        loop {
            match self.lines.next_line().await? {
                None => return Ok(None),
                Some(line) => {
                    self.line_no += 1;
                    if line.trim().is_empty() {
                        continue; // tolerate a trailing blank line
                    }
                    return self.parse_line(&line).map(Some);
                }
            }
        }
    }
}

/// In-memory bet source, mainly for tests and demos.
pub struct VecBetSource {
    bets: std::vec::IntoIter<Bet>,
}

impl VecBetSource {
    /// Create a source over the given bets, yielded in order.
    pub fn new(bets: Vec<Bet>) -> Self {
        Self {
            bets: bets.into_iter(),
        }
    }
}

impl BetSource for VecBetSource {
    async fn next_bet(&mut self) -> Result<Option<Bet>> {
        Ok(self.bets.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_csv_source_reads_ordered_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Juan,Perez,30904465,1999-03-17,7574").unwrap();
        writeln!(file, "Maria,Gomez,40123456,2001-07-01,11").unwrap();
        file.flush().unwrap();

        let mut source = CsvBetSource::open(file.path()).await.unwrap();

        let first = source.next_bet().await.unwrap().unwrap();
        assert_eq!(
            first,
            Bet::new("Juan", "Perez", "30904465", "1999-03-17", "7574")
        );

        let second = source.next_bet().await.unwrap().unwrap();
        assert_eq!(second.name, "Maria");

        assert!(source.next_bet().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_csv_source_rejects_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Juan,Perez,30904465").unwrap();
        file.flush().unwrap();

        let mut source = CsvBetSource::open(file.path()).await.unwrap();
        let err = source.next_bet().await.unwrap_err();
        assert!(err.to_string().contains("expected 5 fields"));
    }

    #[tokio::test]
    async fn test_csv_source_tolerates_trailing_blank_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Juan,Perez,30904465,1999-03-17,7574").unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let mut source = CsvBetSource::open(file.path()).await.unwrap();
        assert!(source.next_bet().await.unwrap().is_some());
        assert!(source.next_bet().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_vec_source_order_and_exhaustion() {
        let bets = vec![
            Bet::new("A", "B", "1", "2000-01-01", "1"),
            Bet::new("C", "D", "2", "2000-01-02", "2"),
        ];
        let mut source = VecBetSource::new(bets.clone());

        assert_eq!(source.next_bet().await.unwrap().unwrap(), bets[0]);
        assert_eq!(source.next_bet().await.unwrap().unwrap(), bets[1]);
        assert!(source.next_bet().await.unwrap().is_none());
    }
}
