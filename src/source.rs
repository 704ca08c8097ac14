use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use rayon::prelude::*;

const SEGMENT_SIZE: usize = 1 << 21;

/// Sequential reader yielding raw lines with the line terminator removed.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl LineSource<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(LineSource::new(BufReader::with_capacity(SEGMENT_SIZE, file)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        LineSource {
            reader,
            buf: Vec::with_capacity(256),
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Counts the lines of `path` the same way [`LineSource`] would yield them:
/// every `\n` ends a line and a trailing unterminated line counts once.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(count_newlines(&mmap))
}

#[inline]
fn count_newlines(data: &[u8]) -> usize {
    let terminated = data
        .par_chunks(SEGMENT_SIZE)
        .map(|segment| segment.iter().filter(|&&b| b == b'\n').count())
        .sum::<usize>();
    match data.last() {
        Some(&b'\n') | None => terminated,
        Some(_) => terminated + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};

    fn lines_of(input: &str) -> Vec<String> {
        LineSource::new(Cursor::new(input.as_bytes()))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn strips_line_terminators() {
        assert_eq!(lines_of("a:1\nb:2\r\nc:3"), vec!["a:1", "b:2", "c:3"]);
        assert_eq!(lines_of("a:1\n\n"), vec!["a:1", ""]);
        assert!(lines_of("").is_empty());
    }

    #[test]
    fn replaces_invalid_utf8() {
        let bytes: &[u8] = b"ok:1\n\xffbad:2\n";
        let lines = LineSource::new(Cursor::new(bytes))
            .collect::<io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("bad:2"));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn surfaces_read_errors() {
        let mut source = LineSource::new(BufReader::new(FailingReader));
        assert!(matches!(source.next(), Some(Err(_))));
    }

    #[test]
    fn counts_match_line_source() {
        for input in ["", "a:1", "a:1\n", "a:1\nb:2", "a:1\nb:2\n", "\n\n\n", "x\r\ny\r\n"] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(input.as_bytes()).unwrap();
            file.flush().unwrap();
            let expected = LineSource::open(file.path()).unwrap().count();
            assert_eq!(count_lines(file.path()).unwrap(), expected, "input {input:?}");
        }
    }

    #[test]
    fn counts_across_segments() {
        let mut data = vec![b'x'; SEGMENT_SIZE * 2 + 17];
        for i in (0..data.len()).step_by(1000) {
            data[i] = b'\n';
        }
        let expected = data.iter().filter(|&&b| b == b'\n').count() + 1;
        assert_eq!(count_newlines(&data), expected);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(count_lines(&dir.path().join("nope.txt")).is_err());
    }
}
