// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises raw call text before n-gram extraction so that
// "Buy!", "buy" and "BUY 2x" all produce the token "buy".
//
// Normalisation steps (applied in order):
//   1. Lowercase every character
//   2. Map punctuation, digits, symbols and control characters
//      (including Unicode whitespace variants) to a plain space
//   3. Collapse runs of spaces and trim the ends

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalise a raw text into lowercase words separated by single spaces.
    pub fn normalize(&self, text: &str) -> String {

        // ── Step 1 + 2: Lowercase and blank out non-letters ──────────────────
        let letters: String = text
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| if c.is_alphabetic() { c } else { ' ' })
            .collect();

        // ── Step 3: Collapse whitespace ───────────────────────────────────────
        let mut out        = String::with_capacity(letters.len());
        let mut last_space = true;

        for c in letters.chars() {
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        out.trim_end().to_string()
    }

    /// Normalised words in their original order (duplicates kept).
    pub fn words(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(p.normalize("Please, BUY now!"), "please buy now");
    }

    #[test]
    fn test_digits_become_separators() {
        let p = Preprocessor::new();
        assert_eq!(p.normalize("order42refund"), "order refund");
    }

    #[test]
    fn test_collapses_whitespace_and_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.normalize("  cancel\t\u{00A0}my \x01 refund  "), "cancel my refund");
    }

    #[test]
    fn test_words_keeps_order() {
        let p = Preprocessor::new();
        assert_eq!(p.words("b a b"), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.normalize(""), "");
        assert!(p.words("   ...  ").is_empty());
    }
}
