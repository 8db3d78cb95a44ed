use std::fmt;
use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;
use tracing::warn;

static ENCODING: OnceLock<Option<CoreBPE>> = OnceLock::new();

/// Special tokens of cl100k_base. Text containing one is refused rather
/// than counted.
const SPECIAL_TOKENS: [&str; 5] = [
    "<|endoftext|>",
    "<|fim_prefix|>",
    "<|fim_middle|>",
    "<|fim_suffix|>",
    "<|endofprompt|>",
];

/// Result of counting tokens. `Unavailable` means unknown, not zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCount {
    Known(usize),
    Unavailable,
}

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenCount::Known(n) => write!(f, "{}", n),
            TokenCount::Unavailable => write!(f, "Token count unavailable"),
        }
    }
}

fn encoding() -> Option<&'static CoreBPE> {
    ENCODING
        .get_or_init(|| match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!("cl100k_base encoding unavailable: {}", e);
                None
            }
        })
        .as_ref()
}

/// Counts `text` in the cl100k_base encoding.
pub fn count_tokens(text: &str) -> TokenCount {
    if SPECIAL_TOKENS.iter().any(|special| text.contains(special)) {
        warn!("Text contains a special token; not counting it");
        return TokenCount::Unavailable;
    }
    match encoding() {
        Some(bpe) => TokenCount::Known(bpe.encode_ordinary(text).len()),
        None => TokenCount::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_known_text() {
        assert_eq!(count_tokens(""), TokenCount::Known(0));
        match count_tokens("hello world") {
            TokenCount::Known(n) => assert_eq!(n, 2),
            TokenCount::Unavailable => panic!("cl100k_base should load"),
        }
    }

    #[test]
    fn special_tokens_are_not_counted() {
        assert_eq!(count_tokens("<|endoftext|>"), TokenCount::Unavailable);
        assert_eq!(count_tokens("before <|fim_middle|> after"), TokenCount::Unavailable);
        // A partial marker is ordinary text.
        assert!(matches!(count_tokens("<|endoftext"), TokenCount::Known(n) if n > 0));
    }

    #[test]
    fn unavailable_renders_as_marker() {
        assert_eq!(TokenCount::Unavailable.to_string(), "Token count unavailable");
        assert_eq!(TokenCount::Known(7).to_string(), "7");
    }
}
