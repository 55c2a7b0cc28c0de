//! Transcript chunking under a token budget.
//!
//! Lines are packed greedily, in order, into chunks whose token count stays
//! strictly below the limit. Lines are never split: a line that is already
//! over the limit on its own becomes a chunk by itself.

use crate::tokens::TokenCounter;

/// Split `text` into chunks of whole lines, each under `token_limit` tokens.
///
/// Lines that fit are appended with a trailing newline. When a line does not
/// fit, the current buffer is emitted and the line starts a new one without
/// its newline; the separator is only written once another line joins it.
/// An empty line that starts a buffer this way is written as `"\n"` so it is
/// not confused with an empty chunk. The final buffer is always emitted, even
/// when empty.
///
/// If the very first line is already over the limit the result starts with
/// an empty chunk. Callers that post chunks somewhere should skip empty ones
/// rather than rely on this function to drop them.
pub fn split_into_chunks<C>(text: &str, token_limit: usize, counter: &C) -> Vec<String>
where
    C: TokenCounter + ?Sized,
{
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_tokens = 0usize;
    // set while the buffer holds a flushed-over line still lacking its newline
    let mut open_line = false;

    for line in text.split('\n') {
        let line_tokens = counter.count(line);
        if chunk_tokens + line_tokens < token_limit {
            if open_line {
                chunk.push('\n');
                open_line = false;
            }
            chunk.push_str(line);
            chunk.push('\n');
            chunk_tokens += line_tokens;
        } else {
            chunks.push(std::mem::take(&mut chunk));
            chunk_tokens = line_tokens;
            if line.is_empty() {
                // an empty chunk already means "no lines", so close this one now
                chunk.push('\n');
                open_line = false;
            } else {
                chunk.push_str(line);
                open_line = true;
            }
        }
    }
    chunks.push(chunk);

    chunks
}

/// Size summary of one chunk, as measured by the counter that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStats {
    pub index: usize,
    pub lines: usize,
    pub tokens: usize,
    pub bytes: usize,
}

impl ChunkStats {
    /// True when the chunk exceeds the budget, which only happens for a
    /// single oversized line.
    pub fn over_budget(&self, token_limit: usize) -> bool {
        self.tokens >= token_limit
    }
}

/// Measure each chunk: lines it holds, tokens (summed per line, as the
/// splitter counts them) and bytes.
pub fn chunk_stats<C>(chunks: &[String], counter: &C) -> Vec<ChunkStats>
where
    C: TokenCounter + ?Sized,
{
    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let lines: Vec<&str> = chunk_lines(chunk).collect();
            ChunkStats {
                index,
                lines: lines.len(),
                tokens: lines.iter().map(|line| counter.count(line)).sum(),
                bytes: chunk.len(),
            }
        })
        .collect()
}

/// Lines carried by a chunk, without the newline the splitter appends.
pub fn chunk_lines(chunk: &str) -> impl Iterator<Item = &str> {
    let body = chunk.strip_suffix('\n').unwrap_or(chunk);
    (!chunk.is_empty())
        .then(|| body.split('\n'))
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Reassemble the line sequence from a chunk sequence.
    fn rejoin(chunks: &[String]) -> Vec<String> {
        chunks
            .iter()
            .flat_map(|chunk| chunk_lines(chunk))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn small_transcript_is_one_chunk() {
        let chunks = split_into_chunks("a b\nc d\ne", 100, &words);
        assert_eq!(chunks, vec!["a b\nc d\ne\n".to_string()]);
    }

    #[test]
    fn empty_transcript_yields_single_empty_line_chunk() {
        // splitting "" yields one empty line, which fits and gets a newline
        let chunks = split_into_chunks("", 10, &words);
        assert_eq!(chunks, vec!["\n".to_string()]);
    }

    #[test]
    fn zero_limit_flushes_empty_buffer() {
        // nothing fits a zero budget, not even an empty line
        let chunks = split_into_chunks("", 0, &words);
        assert_eq!(chunks, vec![String::new(), "\n".to_string()]);
        assert_eq!(rejoin(&chunks), vec![""]);
    }

    #[test]
    fn flushes_when_budget_reached() {
        // each line is 2 words, limit 5: two lines fit (4 < 5), third doesn't (6)
        let chunks = split_into_chunks("a a\nb b\nc c\nd d", 5, &words);
        assert_eq!(chunks, vec!["a a\nb b\n".to_string(), "c c\nd d\n".to_string()]);
    }

    #[test]
    fn comparison_is_strict() {
        // 2 + 2 = 4 is not < 4, so the second line starts a new chunk
        let chunks = split_into_chunks("a a\nb b", 4, &words);
        assert_eq!(chunks, vec!["a a\n".to_string(), "b b".to_string()]);

        // 2 + 2 = 4 < 5 fits
        let chunks = split_into_chunks("a a\nb b", 5, &words);
        assert_eq!(chunks, vec!["a a\nb b\n".to_string()]);
    }

    #[test]
    fn flushed_line_gets_newline_when_next_line_joins() {
        let chunks = split_into_chunks("a a\nc c c\nd", 5, &words);
        assert_eq!(chunks, vec!["a a\n".to_string(), "c c c\nd\n".to_string()]);
    }

    #[test]
    fn flushed_empty_line_is_not_lost() {
        // the oversized line flushes an empty line into a fresh buffer
        let chunks = split_into_chunks("x x x x\n\nb", 3, &words);
        assert_eq!(
            chunks,
            vec![String::new(), "x x x x".to_string(), "\nb\n".to_string()]
        );
        assert_eq!(rejoin(&chunks), vec!["x x x x", "", "b"]);
    }

    #[test]
    fn empty_line_between_oversized_lines_is_kept() {
        let chunks = split_into_chunks("x x x x\n\ny y y y", 3, &words);
        assert_eq!(
            chunks,
            vec![
                String::new(),
                "x x x x".to_string(),
                "\n".to_string(),
                "y y y y".to_string()
            ]
        );
        assert_eq!(rejoin(&chunks), vec!["x x x x", "", "y y y y"]);
    }

    #[test]
    fn lines_round_trip_with_blank_lines_under_zero_budget() {
        let transcript = "a\n\n\nb b\n";
        let chunks = split_into_chunks(transcript, 0, &words);
        let original: Vec<&str> = transcript.split('\n').collect();
        assert_eq!(rejoin(&chunks), original);
    }

    #[test]
    fn oversized_line_stands_alone() {
        let chunks = split_into_chunks("a\nx x x x x x\nb", 4, &words);
        assert_eq!(
            chunks,
            vec!["a\n".to_string(), "x x x x x x".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn oversized_first_line_produces_leading_empty_chunk() {
        let chunks = split_into_chunks("x x x x x\na", 3, &words);
        assert_eq!(chunks[0], "");
        assert_eq!(chunks[1], "x x x x x");
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn trailing_newline_is_kept_as_empty_line() {
        let chunks = split_into_chunks("a\nb\n", 10, &words);
        assert_eq!(chunks, vec!["a\nb\n\n".to_string()]);
    }

    #[test]
    fn lines_round_trip() {
        let transcript = (0..200)
            .map(|i| format!("speaker {}: {}", i % 3, "word ".repeat(i % 7)))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = split_into_chunks(&transcript, 12, &words);

        let original: Vec<String> = transcript.split('\n').map(str::to_string).collect();
        assert!(chunks.len() > 1);
        assert_eq!(rejoin(&chunks), original);
    }

    #[test]
    fn lines_round_trip_with_oversized_lines() {
        let transcript = "intro\nthis line is far too long for the budget\nshort\nanother very long line that overflows too\nend";
        let chunks = split_into_chunks(transcript, 4, &words);

        let original: Vec<&str> = transcript.split('\n').collect();
        assert_eq!(rejoin(&chunks), original);
    }

    #[test]
    fn budget_respected_except_for_single_lines() {
        let transcript = "one two three\nfour\nfive six seven eight nine ten eleven\ntwelve thirteen\nfourteen";
        let limit = 5;
        let chunks = split_into_chunks(transcript, limit, &words);
        for stats in chunk_stats(&chunks, &words) {
            if stats.over_budget(limit) {
                assert_eq!(stats.lines, 1, "oversized chunk {:?} must be one line", stats);
            }
        }
        assert!(chunks.contains(&"five six seven eight nine ten eleven".to_string()));
    }

    #[test]
    fn chunking_is_deterministic() {
        let transcript = "alpha beta\ngamma\ndelta epsilon zeta\neta";
        let first = split_into_chunks(transcript, 4, &words);
        for _ in 0..10 {
            assert_eq!(split_into_chunks(transcript, 4, &words), first);
        }
    }

    #[test]
    fn stats_report_lines_tokens_and_bytes() {
        let chunks = vec!["a b\nc\n".to_string(), "d e f".to_string(), String::new()];
        let stats = chunk_stats(&chunks, &words);
        assert_eq!(
            stats[0],
            ChunkStats {
                index: 0,
                lines: 2,
                tokens: 3,
                bytes: 6
            }
        );
        assert_eq!(stats[1].lines, 1);
        assert_eq!(stats[1].tokens, 3);
        assert_eq!(stats[2].lines, 0);
        assert_eq!(stats[2].tokens, 0);
    }

    #[test]
    fn chunk_lines_strips_single_trailing_newline() {
        assert_eq!(chunk_lines("a\nb\n").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(chunk_lines("a\n\n").collect::<Vec<_>>(), vec!["a", ""]);
        assert_eq!(chunk_lines("solo").collect::<Vec<_>>(), vec!["solo"]);
        assert_eq!(chunk_lines("").count(), 0);
    }
}
