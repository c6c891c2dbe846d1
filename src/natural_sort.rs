//! Human ordering of file and directory names ("frame_2" before "frame_10").

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::error::{PoseCsvError, Result};

/// Optionally signed integer or decimal. Only the unsigned part is captured,
/// so a sign is consumed as a separator and dropped from the key.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]?([0-9]+(?:[.][0-9]*)?|[.][0-9]+)").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq)]
pub enum KeyToken {
    Text(String),
    Number(f64),
}

impl KeyToken {
    fn kind(&self) -> &'static str {
        match self {
            KeyToken::Text(_) => "text",
            KeyToken::Number(_) => "number",
        }
    }
}

/// Sort key made of alternating text and numeric runs.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalKey {
    source: String,
    tokens: Vec<KeyToken>,
}

impl NaturalKey {
    pub fn new(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut last = 0;

        for caps in NUMBER_RE.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            tokens.push(KeyToken::Text(text[last..whole.start()].to_string()));
            // The pattern only matches digit runs with at most one dot.
            let value = number.as_str().parse::<f64>().unwrap_or(0.0);
            tokens.push(KeyToken::Number(value));
            last = whole.end();
        }
        tokens.push(KeyToken::Text(text[last..].to_string()));

        Self {
            source: text.to_string(),
            tokens,
        }
    }

    /// Build a key from explicit tokens.
    pub fn from_tokens<S: Into<String>>(source: S, tokens: Vec<KeyToken>) -> Self {
        Self {
            source: source.into(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &[KeyToken] {
        &self.tokens
    }

    /// Element-wise comparison; a key that is a prefix of another sorts first.
    /// Text against number at the same position is unsupported input.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        for (a, b) in self.tokens.iter().zip(&other.tokens) {
            let ord = match (a, b) {
                (KeyToken::Text(a), KeyToken::Text(b)) => a.cmp(b),
                (KeyToken::Number(a), KeyToken::Number(b)) => a.total_cmp(b),
                _ => {
                    tracing::debug!(
                        "Token kind mismatch: {} vs {}",
                        a.kind(),
                        b.kind()
                    );
                    return Err(PoseCsvError::UnsupportedSortInput {
                        left: self.source.clone(),
                        right: other.source.clone(),
                    });
                }
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(self.tokens.len().cmp(&other.tokens.len()))
    }
}

/// Stable natural sort of `items` by the name `name_of` projects.
pub fn natural_sort_by<T, F, K>(items: &mut [T], name_of: F) -> Result<()>
where
    F: Fn(&T) -> K,
    K: AsRef<str>,
{
    let mut keyed: Vec<(NaturalKey, usize)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (NaturalKey::new(name_of(item).as_ref()), i))
        .collect();

    let mut failure = None;
    keyed.sort_by(|(a, _), (b, _)| match a.try_cmp(b) {
        Ok(ord) => ord,
        Err(e) => {
            failure.get_or_insert(e);
            Ordering::Equal
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    let order: Vec<usize> = keyed.into_iter().map(|(_, i)| i).collect();
    apply_order(items, &order);
    Ok(())
}

/// Sort plain names in place.
pub fn natural_sort<S: AsRef<str>>(names: &mut [S]) -> Result<()> {
    natural_sort_by(names, |name| name.as_ref().to_owned())
}

// Permute `items` so that position i holds the element previously at order[i].
fn apply_order<T>(items: &mut [T], order: &[usize]) {
    let mut placed = vec![false; items.len()];
    for start in 0..items.len() {
        if placed[start] {
            continue;
        }
        let mut current = start;
        loop {
            placed[current] = true;
            let source = order[current];
            if placed[source] {
                break;
            }
            items.swap(current, source);
            current = source;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_numbers_sort_numerically() {
        let mut files = vec!["f2.json", "f10.json", "f1.json"];
        natural_sort(&mut files).unwrap();
        assert_eq!(files, vec!["f1.json", "f2.json", "f10.json"]);
    }

    #[test]
    fn test_openpose_style_names() {
        let mut files = vec![
            "video_000000000010_keypoints.json".to_string(),
            "video_000000000002_keypoints.json".to_string(),
            "video_000000000001_keypoints.json".to_string(),
        ];
        natural_sort(&mut files).unwrap();
        assert_eq!(files[0], "video_000000000001_keypoints.json");
        assert_eq!(files[1], "video_000000000002_keypoints.json");
        assert_eq!(files[2], "video_000000000010_keypoints.json");
    }

    #[test]
    fn test_tokens_alternate_text_and_numbers() {
        let key = NaturalKey::new("frame_12.json");
        assert_eq!(
            key.tokens(),
            &[
                KeyToken::Text("frame_".to_string()),
                KeyToken::Number(12.0),
                KeyToken::Text("json".to_string()),
            ]
        );

        let key = NaturalKey::new("clip");
        assert_eq!(key.tokens(), &[KeyToken::Text("clip".to_string())]);
    }

    #[test]
    fn test_sign_is_dropped() {
        let key = NaturalKey::new("take-3");
        assert_eq!(
            key.tokens(),
            &[
                KeyToken::Text("take".to_string()),
                KeyToken::Number(3.0),
                KeyToken::Text(String::new()),
            ]
        );
    }

    #[test]
    fn test_decimal_runs() {
        let mut names = vec!["s1.5", "s1.25", "s.5"];
        natural_sort(&mut names).unwrap();
        assert_eq!(names, vec!["s.5", "s1.25", "s1.5"]);
    }

    #[test]
    fn test_prefix_sorts_first() {
        let a = NaturalKey::new("clip");
        let b = NaturalKey::new("clip2");
        assert_eq!(a.try_cmp(&b).unwrap(), Ordering::Less);
        assert_eq!(b.try_cmp(&a).unwrap(), Ordering::Greater);
        assert_eq!(a.try_cmp(&a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_mixed_token_kinds_are_rejected() {
        let text = NaturalKey::from_tokens("nan", vec![KeyToken::Text("nan".to_string())]);
        let number = NaturalKey::from_tokens("7", vec![KeyToken::Number(7.0)]);

        let err = text.try_cmp(&number).unwrap_err();
        assert!(matches!(err, PoseCsvError::UnsupportedSortInput { .. }));
    }

    #[test]
    fn test_sort_by_projection_is_stable() {
        let mut entries = vec![("b10", 0), ("b2", 1), ("a", 2), ("b2", 3)];
        natural_sort_by(&mut entries, |(name, _)| *name).unwrap();
        assert_eq!(entries, vec![("a", 2), ("b2", 1), ("b2", 3), ("b10", 0)]);
    }
}
