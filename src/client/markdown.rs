//! Display clean-up for streamed markdown

use once_cell::sync::Lazy;
use regex::Regex;

// Emphasis markers that the model emitted with padding inside them.
static SPACED_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\s+([^*]+?)\s+\*\*").expect("valid regex"));
static SPACED_DOUBLE_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__\s+([^_]+?)\s+__").expect("valid regex"));
static SPACED_ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_\s+([^_]+?)\s+_").expect("valid regex"));

/// Collapse `** bold **` to `**bold**`, `__ bold __` to `**bold**` and
/// `_ italic _` to `_italic_`.
pub fn tidy_markdown(text: &str) -> String {
    let text = SPACED_BOLD.replace_all(text, "**$1**");
    let text = SPACED_DOUBLE_UNDERSCORE.replace_all(&text, "**$1**");
    SPACED_ITALIC.replace_all(&text, "_${1}_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_padded_emphasis() {
        assert_eq!(tidy_markdown("a ** bold ** b"), "a **bold** b");
        assert_eq!(tidy_markdown("a __ strong __ b"), "a **strong** b");
        assert_eq!(tidy_markdown("a _ it _ b"), "a _it_ b");
    }

    #[test]
    fn leaves_clean_markdown_alone() {
        let text = "**Files in site**\n\n• src/main.rs";
        assert_eq!(tidy_markdown(text), text);
    }
}
