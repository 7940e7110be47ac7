/// Sliding character window over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Window length in characters.
    pub size: usize,
    /// Characters shared by consecutive windows. Must be `< size`.
    pub overlap: usize,
    /// Chunks kept per document; the tail beyond this is dropped.
    pub max_chunks: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: 800,
            overlap: 100,
            max_chunks: 50,
        }
    }
}

/// Split `text` into at most `cfg.max_chunks` overlapping windows.
///
/// Windows are measured in `char`s so multi-byte text is never split inside
/// a code point. Each window is trimmed; whitespace-only windows are dropped.
pub fn chunk_text(text: &str, cfg: &ChunkConfig) -> Vec<String> {
    let size = cfg.size.max(1);
    let step = size.saturating_sub(cfg.overlap).max(1);

    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() && out.len() < cfg.max_chunks {
        let end = (start + size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(size: usize, overlap: usize, max_chunks: usize) -> ChunkConfig {
        ChunkConfig {
            size,
            overlap,
            max_chunks,
        }
    }

    #[test]
    fn windows_overlap() {
        let chunks = chunk_text("abcdefghij", &cfg(4, 1, 10));
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("  hello  ", &ChunkConfig::default()), vec!["hello"]);
        assert!(chunk_text("", &ChunkConfig::default()).is_empty());
        assert!(chunk_text("    ", &ChunkConfig::default()).is_empty());
    }

    #[test]
    fn max_chunks_caps_output() {
        let text = "x".repeat(40_000);
        let chunks = chunk_text(&text, &ChunkConfig::default());
        assert_eq!(chunks.len(), 50);
        assert!(chunks.iter().all(|c| c.chars().count() == 800));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "₹".repeat(10);
        let chunks = chunk_text(&text, &cfg(4, 0, 10));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "₹₹");
    }
}
