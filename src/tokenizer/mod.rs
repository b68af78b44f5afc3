//! Whitespace tokenizer feeding the router.
//!
//! Tokens are whitespace-delimited words with a zero-based position. The
//! position is display metadata only; routing looks at the text alone.
//!
//! # Example
//!
//! ```
//! use moe_router::tokenizer::tokenize;
//!
//! let tokens = tokenize("  What is 2 +  2? ");
//! let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(words, ["What", "is", "2", "+", "2?"]);
//! assert_eq!(tokens[4].index, 4);
//! ```

use serde::{Deserialize, Serialize};

/// Tokens shown at once by the playback view
pub const MAX_DISPLAYED_TOKENS: usize = 21;

/// A word in the input sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Raw word, never empty when produced by [`tokenize`]
    pub text: String,
    /// Zero-based position in the sequence
    pub index: usize,
}

impl Token {
    /// Create a token
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }
}

/// Split `text` on whitespace into indexed tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, word)| Token::new(word, index))
        .collect()
}

/// Tokenize and keep only the first `max_tokens` tokens.
pub fn tokenize_limited(text: &str, max_tokens: usize) -> Vec<Token> {
    text.split_whitespace()
        .take(max_tokens)
        .enumerate()
        .map(|(index, word)| Token::new(word, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_indices() {
        let tokens = tokenize("the quick\tbrown\nfox");
        assert_eq!(tokens.len(), 4);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.index, i);
            assert!(!token.text.is_empty());
        }
        assert_eq!(tokens[3].text, "fox");
    }

    #[test]
    fn test_tokenize_blank() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_punctuation() {
        let tokens = tokenize("Hello, world!");
        assert_eq!(tokens[0].text, "Hello,");
        assert_eq!(tokens[1].text, "world!");
    }

    #[test]
    fn test_tokenize_limited() {
        let text = (0..30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let tokens = tokenize_limited(&text, MAX_DISPLAYED_TOKENS);
        assert_eq!(tokens.len(), MAX_DISPLAYED_TOKENS);
        assert_eq!(tokens.last().unwrap().text, "w20");

        assert_eq!(tokenize_limited("a b", 10).len(), 2);
        assert!(tokenize_limited("a b", 0).is_empty());
    }
}
