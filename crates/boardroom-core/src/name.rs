//! Name canonicalization and honorific splitting.
//!
//! Every name equality test in the registry goes through [`normalize`] first,
//! so two spellings that normalize identically are the same name.

use unicode_normalization::{UnicodeNormalization as _, char::is_combining_mark};

// ─── Honorifics ──────────────────────────────────────────────────────────────

/// Single-token honorifics, in normalized form.
const ATOMIC_TITLES: &[&str] = &[
  "YABHG", "YBHG", "YAB", "YBM", "YTM", "YAM", "YM", "YB", "SENATOR", "TUN",
  "DATO", "DATO'", "DATUK", "DATIN", "PUAN", "ENCIK", "CIK", "DR", "IR", "PROF",
  "HAJI", "HAJAH", "MR", "MRS", "MS", "MISS", "MADAM",
];

/// Two-token honorifics. These are tried before [`ATOMIC_TITLES`] at each
/// position, so `DATO' SRI` is consumed whole rather than as `DATO'`.
const COMPOUND_TITLES: &[(&str, &str)] = &[
  ("TAN", "SRI"),
  ("TAN", "SERI"),
  ("DATO'", "SRI"),
  ("DATO", "SRI"),
  ("DATO'", "SERI"),
  ("DATO", "SERI"),
  ("DATUK", "SERI"),
  ("TOH", "PUAN"),
  ("DATIN", "PADUKA"),
];

/// Apostrophe look-alikes seen in scraped names.
const APOSTROPHES: &[char] = &['\u{2019}', '\u{2018}', '\u{02BC}', '\u{00B4}', '`'];

/// UTF-8 right single quote decoded as Windows-1252.
const MOJIBAKE_APOSTROPHE: &str = "\u{00E2}\u{20AC}\u{2122}";

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Canonicalize a raw name for comparison.
///
/// Upper-cases, folds diacritics, maps apostrophe variants to `'`, strips
/// dots and collapses whitespace. Common abbreviations are expanded token by
/// token (`Y B` → `YB`, interior `B` → `BIN`, `HJ` → `HAJI`,
/// `HJH` → `HAJAH`). The result is a fixed point: normalizing it again
/// changes nothing.
pub fn normalize(raw: &str) -> String {
  // Look-alikes are mapped on both sides of decomposition: U+00B4 decomposes
  // into a space and an accent, U+0149 into U+02BC and `n`.
  let repaired = raw
    .replace(MOJIBAKE_APOSTROPHE, "'")
    .replace(APOSTROPHES, "'");

  // Upper-casing can yield characters that decompose further.
  let upper: String = repaired
    .nfkd()
    .filter(|c| !is_combining_mark(*c))
    .flat_map(char::to_uppercase)
    .collect();
  let folded: String = upper
    .nfkd()
    .filter(|c| !is_combining_mark(*c))
    .map(|c| if APOSTROPHES.contains(&c) { '\'' } else { c })
    .filter(|c| *c != '.')
    .collect();

  expand_tokens(folded.split_whitespace()).join(" ")
}

fn expand_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
  let mut merged: Vec<&str> = Vec::new();
  for token in tokens {
    if token == "B" && matches!(merged.last(), Some(&"Y")) {
      merged.pop();
      merged.push("YB");
    } else {
      merged.push(token);
    }
  }

  let last = merged.len().saturating_sub(1);
  merged
    .iter()
    .enumerate()
    .map(|(i, token)| match *token {
      "B" if i > 0 && i < last => "BIN",
      "HJ" if i < last => "HAJI",
      "HJH" if i < last => "HAJAH",
      other => other,
    })
    .collect()
}

/// Whether two names are equal after normalization. Empty names never match.
pub fn same_name(a: &str, b: &str) -> bool {
  let a = normalize(a);
  !a.is_empty() && a == normalize(b)
}

/// `title` and `name` joined with a space, ignoring an absent or empty title.
pub fn titled(title: Option<&str>, name: &str) -> String {
  match title.map(str::trim).filter(|t| !t.is_empty()) {
    Some(t) => format!("{t} {}", name.trim()),
    None => name.trim().to_owned(),
  }
}

// ─── Title splitter ──────────────────────────────────────────────────────────

/// The result of [`split_title`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSplit {
  /// Leading honorifics, or `None` if the name carried none.
  pub title: Option<String>,
  /// The normalized name with honorifics removed.
  pub name:  String,
}

/// Strip the leading run of honorifics from `full_name`.
///
/// Works greedily from the front of the normalized token list: at each
/// position a two-token compound is tried first, then a single-token title;
/// the first token that is neither ends the title.
pub fn split_title(full_name: &str) -> TitleSplit {
  let normalized = normalize(full_name);
  let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

  let mut consumed = 0;
  while consumed < tokens.len() {
    let token = tokens[consumed];
    if let Some(&next) = tokens.get(consumed + 1)
      && COMPOUND_TITLES.iter().any(|&(a, b)| a == token && b == next)
    {
      consumed += 2;
    } else if ATOMIC_TITLES.iter().any(|&t| t == token) {
      consumed += 1;
    } else {
      break;
    }
  }

  let title = tokens[..consumed].join(" ");
  TitleSplit {
    title: (!title.is_empty()).then_some(title),
    name:  tokens[consumed..].join(" "),
  }
}
