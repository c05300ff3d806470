// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting long transcript entries into postable pieces.

/// Splits `text` into chunks of at most `max` characters.
///
/// Text within the limit is returned whole. Longer text is split on line
/// boundaries; a single line longer than `max` is hard-split. Joining the
/// chunks with newlines reproduces the text except where a line was
/// hard-split.
pub fn split_into_chunks(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    if text.chars().count() <= max {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        for piece in hard_split(line, max) {
            let piece_len = piece.chars().count();
            current = match current.take() {
                None => Some((piece, piece_len)),
                Some((mut buf, len)) if len + 1 + piece_len <= max => {
                    buf.push('\n');
                    buf.push_str(&piece);
                    Some((buf, len + 1 + piece_len))
                }
                Some((buf, _)) => {
                    chunks.push(buf);
                    Some((piece, piece_len))
                }
            };
        }
    }

    if let Some((buf, _)) = current {
        chunks.push(buf);
    }
    chunks
}

fn hard_split(line: &str, max: usize) -> Vec<String> {
    if line.chars().count() <= max {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}
