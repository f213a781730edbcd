//! Line reader for text trace files
//!
//! Reads raw bytes up to each newline and decodes them as UTF-8. Malformed
//! sequences are replaced with U+FFFD and counted; they never stop the read.
//! Both `\n` and `\r\n` terminators are stripped.

use crate::types::{LogLine, ParseError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Iterator over the lines of a text input
pub struct LineReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    bytes_read: u64,
    decode_faults: usize,
}

impl LineReader<BufReader<File>> {
    /// Open a file for line reading; also returns its size in bytes
    pub fn open(path: &Path) -> Result<(Self, u64)> {
        log::info!("Opening trace file: {:?}", path);

        if !path.exists() {
            return Err(ParseError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let total_bytes = file.metadata()?.len();

        Ok((Self::new(BufReader::new(file)), total_bytes))
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            bytes_read: 0,
            decode_faults: 0,
        }
    }

    /// Raw bytes consumed so far, including line terminators
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of lines that needed replacement characters
    pub fn decode_faults(&self) -> usize {
        self.decode_faults
    }

    fn read_line(&mut self) -> Result<Option<LogLine>> {
        self.buf.clear();
        let consumed = self.reader.read_until(b'\n', &mut self.buf)?;
        if consumed == 0 {
            return Ok(None);
        }

        let offset = self.bytes_read;
        self.bytes_read += consumed as u64;
        self.line_number += 1;

        let mut end = self.buf.len();
        if end > 0 && self.buf[end - 1] == b'\n' {
            end -= 1;
            if end > 0 && self.buf[end - 1] == b'\r' {
                end -= 1;
            }
        }

        let text = match std::str::from_utf8(&self.buf[..end]) {
            Ok(text) => text.to_string(),
            Err(_) => {
                self.decode_faults += 1;
                log::trace!("Replacing malformed UTF-8 on line {}", self.line_number);
                String::from_utf8_lossy(&self.buf[..end]).into_owned()
            }
        };

        Ok(Some(LogLine::new(self.line_number, offset, text)))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lines_offsets_and_terminators() {
        let input = b"first\r\nsecond\n\nlast";
        let mut reader = LineReader::new(Cursor::new(&input[..]));

        let lines: Vec<LogLine> = reader.by_ref().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], LogLine::new(1, 0, "first"));
        assert_eq!(lines[1], LogLine::new(2, 7, "second"));
        assert_eq!(lines[2], LogLine::new(3, 14, ""));
        assert_eq!(lines[3], LogLine::new(4, 15, "last"));
        assert_eq!(reader.bytes_read(), input.len() as u64);
        assert_eq!(reader.decode_faults(), 0);
    }

    #[test]
    fn test_malformed_utf8_is_replaced() {
        let input = b"ok\nbad \xff\xfe byte\nok again\n";
        let mut reader = LineReader::new(Cursor::new(&input[..]));

        let lines: Vec<LogLine> = reader.by_ref().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].text.starts_with("bad "));
        assert!(lines[1].text.contains('\u{FFFD}'));
        assert!(lines[1].text.ends_with(" byte"));
        assert_eq!(lines[2].text, "ok again");
        assert_eq!(reader.decode_faults(), 1);
    }

    #[test]
    fn test_empty_input() {
        let mut reader = LineReader::new(Cursor::new(Vec::new()));
        assert!(reader.next().is_none());
        assert_eq!(reader.bytes_read(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let result = LineReader::open(Path::new("nonexistent_trace.txt"));
        assert!(matches!(result, Err(ParseError::FileNotFound(_))));
    }
}
