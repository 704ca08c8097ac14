use std::io;

pub type Chunk = Vec<String>;

/// Groups lines into fixed-size chunks.
///
/// A full buffer is handed out by value and replaced with a fresh one, so a
/// dispatched chunk never aliases the buffer still being filled.
#[derive(Debug)]
pub(crate) struct ChunkBuilder {
    chunk_size: usize,
    buffer: Chunk,
}

impl ChunkBuilder {
    pub(crate) fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        ChunkBuilder {
            chunk_size,
            buffer: Vec::with_capacity(chunk_size),
        }
    }

    /// Buffers `line`, returning a complete chunk once the buffer is full.
    #[inline]
    pub fn push(&mut self, line: String) -> Option<Chunk> {
        self.buffer.push(line);
        if self.buffer.len() >= self.chunk_size {
            return Some(std::mem::replace(
                &mut self.buffer,
                Vec::with_capacity(self.chunk_size),
            ));
        }
        None
    }

    /// Hands out the trailing partial chunk, if any lines remain.
    pub fn finish(self) -> Option<Chunk> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

/// Drains `lines` into chunks of `chunk_size`, calling `dispatch` for each.
///
/// Stops at the first read error and returns it. A zero `chunk_size` fails
/// with `InvalidInput` before anything is read. On success returns the number
/// of chunks dispatched.
pub fn dispatch_chunks<I, F>(lines: I, chunk_size: usize, mut dispatch: F) -> io::Result<usize>
where
    I: IntoIterator<Item = io::Result<String>>,
    F: FnMut(Chunk),
{
    if chunk_size == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "chunk size must be positive",
        ));
    }
    let mut builder = ChunkBuilder::new(chunk_size);
    let mut dispatched = 0;
    for line in lines {
        if let Some(chunk) = builder.push(line?) {
            tracing::trace!(chunk = dispatched, lines = chunk.len(), "dispatching chunk");
            dispatch(chunk);
            dispatched += 1;
        }
    }
    if let Some(chunk) = builder.finish() {
        tracing::trace!(chunk = dispatched, lines = chunk.len(), "dispatching final chunk");
        dispatch(chunk);
        dispatched += 1;
    }
    Ok(dispatched)
}

/// Number of chunks `total_lines` lines split into. `chunk_size` must be
/// positive, as enforced by `PipelineConfig::validate`.
#[inline]
pub fn expected_chunks(total_lines: usize, chunk_size: usize) -> usize {
    total_lines.div_ceil(chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_lines(n: usize) -> impl Iterator<Item = io::Result<String>> {
        (0..n).map(|i| Ok(format!("k:{i}")))
    }

    fn collect_chunks(n: usize, chunk_size: usize) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let dispatched = dispatch_chunks(ok_lines(n), chunk_size, |c| chunks.push(c)).unwrap();
        assert_eq!(dispatched, chunks.len());
        chunks
    }

    #[test]
    fn splits_into_full_chunks_and_remainder() {
        let chunks = collect_chunks(10, 4);
        let sizes: Vec<_> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(chunks[0][0], "k:0");
        assert_eq!(chunks[2][1], "k:9");
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let sizes: Vec<_> = collect_chunks(8, 4).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4]);
    }

    #[test]
    fn empty_input_dispatches_nothing() {
        assert!(collect_chunks(0, 100).is_empty());
    }

    #[test]
    fn dispatched_chunk_is_not_affected_by_later_pushes() {
        let mut builder = ChunkBuilder::new(2);
        assert!(builder.push("a:1".into()).is_none());
        let first = builder.push("b:2".into()).unwrap();
        builder.push("c:3".into());
        assert_eq!(first, vec!["a:1", "b:2"]);
        assert_eq!(builder.finish().unwrap(), vec!["c:3"]);
    }

    #[test]
    fn read_error_aborts_dispatch() {
        let lines = vec![
            Ok("a:1".to_string()),
            Ok("b:2".to_string()),
            Err(io::Error::new(io::ErrorKind::Other, "boom")),
            Ok("c:3".to_string()),
        ];
        let mut chunks = Vec::new();
        let result = dispatch_chunks(lines, 1, |c| chunks.push(c));
        assert!(result.is_err());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn zero_chunk_size_is_invalid_input() {
        let mut chunks = Vec::new();
        let err = dispatch_chunks(ok_lines(3), 0, |c| chunks.push(c)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(chunks.is_empty());
    }

    #[test]
    fn expected_chunks_rounds_up() {
        assert_eq!(expected_chunks(0, 100_000), 0);
        assert_eq!(expected_chunks(1, 100_000), 1);
        assert_eq!(expected_chunks(100_000, 100_000), 1);
        assert_eq!(expected_chunks(100_001, 100_000), 2);
        assert_eq!(expected_chunks(7, 1), 7);
    }

    #[test]
    fn expected_chunks_matches_dispatch() {
        for (n, size) in [(0, 3), (1, 3), (3, 3), (10, 3), (10, 1), (10, 100)] {
            assert_eq!(collect_chunks(n, size).len(), expected_chunks(n, size));
        }
    }
}
