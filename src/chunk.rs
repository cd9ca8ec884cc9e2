//! Word-window chunking of page text.

/// Split `text` into windows of at most `max_words` whitespace-separated
/// words, each rejoined with single spaces. `max_words == 0` acts as 1.
pub fn chunk_by_words(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words.max(1))
        .map(|window| window.join(" "))
        .collect()
}
