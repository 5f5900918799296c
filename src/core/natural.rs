//! Natural string comparison: embedded numbers compare by value.
//!
//! Strings are split into numeric runs (digits with at most a glued decimal
//! point) and single non-digit characters. The character that ends a numeric
//! run is consumed by it and yields no token, so "10a" splits to `[10]`.
//! Tokens are compared pairwise up to
//! the shorter token count; a string that is a token-prefix of a longer one
//! compares equal to it.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Other(char),
}

fn flush(run: &mut String, tokens: &mut Vec<Token>) {
    if run.is_empty() {
        return;
    }
    if run.ends_with('.') {
        run.pop();
        tokens.push(Token::Number(std::mem::take(run)));
        tokens.push(Token::Other('.'));
    } else {
        tokens.push(Token::Number(std::mem::take(run)));
    }
}

fn tokenize(s: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else if c == '.' && !run.is_empty() {
            run.push(c);
        } else if run.is_empty() {
            tokens.push(Token::Other(c));
        } else {
            flush(&mut run, &mut tokens);
        }
    }
    flush(&mut run, &mut tokens);
    tokens
}

/// First byte of the case-folded token; non-ASCII folds to `?`.
fn fold_byte(c: char) -> u8 {
    let lower = c.to_lowercase().next().unwrap_or(c);
    if lower.is_ascii() {
        lower as u8
    } else {
        b'?'
    }
}

fn compare_tokens(a: &Token, b: &Token) -> Ordering {
    match (a, b) {
        (Token::Number(x), Token::Number(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => compare_text(x, y),
        },
        (Token::Number(_), Token::Other(_)) => Ordering::Less,
        (Token::Other(_), Token::Number(_)) => Ordering::Greater,
        (Token::Other(x), Token::Other(y)) => fold_byte(*x).cmp(&fold_byte(*y)),
    }
}

fn compare_text(x: &str, y: &str) -> Ordering {
    let fx = x.chars().next().map(fold_byte).unwrap_or(0);
    let fy = y.chars().next().map(fold_byte).unwrap_or(0);
    fx.cmp(&fy)
}

/// Compare two strings naturally.
///
/// An empty string sorts before any non-empty one.
pub fn natural_cmp(s1: &str, s2: &str) -> Ordering {
    match (s1.is_empty(), s2.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let t1 = tokenize(s1);
    let t2 = tokenize(s2);
    for (a, b) in t1.iter().zip(t2.iter()) {
        let ord = compare_tokens(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
        assert_eq!(natural_cmp("item10", "item2"), Ordering::Greater);
        assert_eq!(natural_cmp("1.5", "1.25"), Ordering::Greater);
    }

    #[test]
    fn test_case_folded() {
        assert_eq!(natural_cmp("A", "a"), Ordering::Equal);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
        assert_eq!(natural_cmp("Apple", "banana"), Ordering::Less);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(natural_cmp("", "x"), Ordering::Less);
        assert_eq!(natural_cmp("x", ""), Ordering::Greater);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    #[test]
    fn test_numeric_token_sorts_before_text() {
        assert_eq!(natural_cmp("1a", "aa"), Ordering::Less);
        assert_eq!(natural_cmp("a", "1"), Ordering::Greater);
    }

    #[test]
    fn test_token_prefix_compares_equal() {
        // Comparison stops at the shorter token count.
        assert_eq!(natural_cmp("Door", "Door 2"), Ordering::Equal);
        assert_eq!(natural_cmp("W1", "W1-B"), Ordering::Equal);
    }

    #[test]
    fn test_trailing_point_is_its_own_token() {
        assert_eq!(
            tokenize("12."),
            vec![Token::Number("12".into()), Token::Other('.')]
        );
        assert_eq!(tokenize("12.a"), vec![Token::Number("12".into()), Token::Other('.')]);
    }

    #[test]
    fn test_character_ending_a_number_is_dropped() {
        assert_eq!(tokenize("10a"), vec![Token::Number("10".into())]);
        assert_eq!(tokenize("1.5m"), vec![Token::Number("1.5".into())]);
        assert_eq!(
            tokenize("10 b"),
            vec![Token::Number("10".into()), Token::Other('b')]
        );
        assert_eq!(
            tokenize("W1-A"),
            vec![Token::Other('W'), Token::Number("1".into()), Token::Other('A')]
        );
        assert_eq!(tokenize("W1B"), vec![Token::Other('W'), Token::Number("1".into())]);
    }

    #[test]
    fn test_dropped_character_changes_order() {
        assert_eq!(natural_cmp("10a", "10 b"), Ordering::Equal);
        assert_eq!(natural_cmp("W1-A", "W1B"), Ordering::Equal);
        assert_eq!(natural_cmp("W1-A", "W1-B"), Ordering::Less);
    }

    #[test]
    fn test_unparseable_run_falls_back_to_text() {
        // "1.2.3" is one run that does not parse as a number
        assert_eq!(natural_cmp("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(natural_cmp("1.2.3", "2"), Ordering::Less);
    }
}
