use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Keep letter case; otherwise text is lowercased first.
    pub case_sensitive: bool,
    /// Apply the mteval-v11 style normalization: entity decoding and
    /// punctuation splitting.
    pub normalize: bool,
    /// Drop `. , ? : ; ! " ( )` before splitting.
    pub strip_punctuation: bool,
}

/// Splits `text` into word tokens.
pub fn tokenize(text: &str, options: &NormalizeOptions) -> Vec<String> {
    let mut s = if options.case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    };
    if options.normalize {
        s = normalize_text(&s);
    }
    if options.strip_punctuation {
        s.retain(|c| !is_strippable(c));
    }
    s.split_whitespace().map(str::to_string).collect()
}

fn normalize_text(text: &str) -> String {
    let s = text
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let padded: Vec<char> = std::iter::once(' ')
        .chain(s.chars())
        .chain(std::iter::once(' '))
        .collect();
    let spaced = split_symbols(&padded);
    let spaced = split_possessives(&spaced);
    let spaced = split_periods_and_commas(&spaced);
    let spaced = split_dashes_after_digits(&spaced);

    let out: String = spaced.into_iter().collect();
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII symbols that always become their own token. Apostrophe, dash,
/// period and comma are handled by the context-sensitive passes.
fn is_split_symbol(c: char) -> bool {
    matches!(c,
        '{'..='~' | '['..='`' | ' '..='&' | '('..='+' | ':'..='@' | '/')
}

fn is_strippable(c: char) -> bool {
    matches!(c, '.' | ',' | '?' | ':' | ';' | '!' | '"' | '(' | ')')
}

fn split_symbols(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len() * 2);
    for &c in chars {
        if c != ' ' && is_split_symbol(c) {
            out.extend([' ', c, ' ']);
        } else {
            out.push(c);
        }
    }
    out
}

fn split_possessives(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        let ends_word = chars.get(i + 2).map_or(true, |n| n.is_whitespace());
        if c == '\'' && chars.get(i + 1) == Some(&'s') && ends_word {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

fn split_periods_and_commas(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '.' | ',') {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next_digit = chars.get(i + 1).is_some_and(char::is_ascii_digit);
            if !(prev_digit && next_digit) {
                out.extend([' ', c, ' ']);
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn split_dashes_after_digits(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' && i > 0 && chars[i - 1].is_ascii_digit() {
            out.extend([' ', c, ' ']);
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(case_sensitive: bool, normalize: bool, strip_punctuation: bool) -> NormalizeOptions {
        NormalizeOptions {
            case_sensitive,
            normalize,
            strip_punctuation,
        }
    }

    #[test]
    fn default_lowercases_and_splits_on_whitespace() {
        let tokens = tokenize("  The Cat,  sat\tdown ", &NormalizeOptions::default());
        assert_eq!(tokens, vec!["the", "cat,", "sat", "down"]);
    }

    #[test]
    fn case_sensitive_keeps_case() {
        let tokens = tokenize("The Cat", &opts(true, false, false));
        assert_eq!(tokens, vec!["The", "Cat"]);
    }

    #[test]
    fn normalization_splits_punctuation() {
        let tokens = tokenize("Hello, world! (really)", &opts(false, true, false));
        assert_eq!(tokens, vec!["hello", ",", "world", "!", "(", "really", ")"]);
    }

    #[test]
    fn normalization_keeps_numbers_together() {
        let tokens = tokenize("pi is 3.14, not 1,000.", &opts(false, true, false));
        assert_eq!(tokens, vec!["pi", "is", "3.14", ",", "not", "1,000", "."]);
    }

    #[test]
    fn normalization_handles_possessives_and_dashes() {
        let tokens = tokenize("the cat's toy costs 5-10", &opts(false, true, false));
        assert_eq!(tokens, vec!["the", "cat", "'s", "toy", "costs", "5", "-", "10"]);
    }

    #[test]
    fn normalization_decodes_entities_and_joins_lines() {
        let tokens = tokenize("a &amp; b <skipped>exam-\nple", &opts(false, true, false));
        assert_eq!(tokens, vec!["a", "&", "b", "example"]);
    }

    #[test]
    fn strip_punctuation_removes_marks() {
        let tokens = tokenize("Yes, (maybe) no!", &opts(false, false, true));
        assert_eq!(tokens, vec!["yes", "maybe", "no"]);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("   ", &NormalizeOptions::default()).is_empty());
    }
}
