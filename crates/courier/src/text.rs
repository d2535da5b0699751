//! Text normalization shared by the classifier and dataset lookups.

/// Lowercase `input` and split it into alphanumeric tokens.
///
/// Punctuation, underscores and hyphens all act as separators, so
/// `"Semi-Urban"`, `"semi_urban"` and `"semi urban"` produce the same tokens.
pub fn tokenize(input: &str) -> Vec<String> {
  input
    .to_lowercase()
    .split(|c: char| !c.is_alphanumeric())
    .filter(|token| !token.is_empty())
    .map(str::to_string)
    .collect()
}

/// Normalized single-string form of `input` (tokens joined by one space).
pub fn normalize(input: &str) -> String {
  tokenize(input).join(" ")
}

/// Match one token against a pattern. A trailing `*` makes the pattern a prefix stem.
pub fn token_matches(token: &str, pattern: &str) -> bool {
  match pattern.strip_suffix('*') {
    Some(stem) => token.starts_with(stem),
    None => token == pattern,
  }
}

/// Whether `phrase` (space separated patterns) occurs as a contiguous run of `tokens`.
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
  let parts: Vec<&str> = phrase.split_whitespace().collect();
  if parts.is_empty() || parts.len() > tokens.len() {
    return false;
  }

  tokens
    .windows(parts.len())
    .any(|window| window.iter().zip(&parts).all(|(token, part)| token_matches(token, part)))
}
