//! Turns admin-entered keywords into one case-insensitive alternation regex.
//!
//! Each keyword is expanded into literal variants within its own language
//! (Japanese if it contains any Hiragana, Katakana or Han character, English
//! otherwise); keywords are never cross-translated. Variants are escaped,
//! deduplicated across all keywords in first-seen order, and joined as
//! `(?i)(v1|v2|...)`.

use std::collections::HashSet;

/// Characters escaped in every literal variant.
const META_CHARS: &[char] = &[
    '\\', '.', '*', '+', '?', '^', '$', '(', ')', '[', ']', '{', '}', '|',
];

/// Distance between a Hiragana code point and its Katakana counterpart.
const KANA_OFFSET: u32 = 0x60;

const DEFAULT_ENGLISH: &[(&str, &[&str])] = &[
    ("javascript", &["js"]),
    ("typescript", &["ts"]),
    ("kubernetes", &["k8s"]),
    ("internationalization", &["i18n"]),
    ("localization", &["l10n"]),
    ("continuous integration", &["ci"]),
    ("continuous deployment", &["cd"]),
    ("continuous delivery", &["cd"]),
];

const DEFAULT_JAPANESE: &[(&str, &[&str])] = &[
    ("プログラミング", &["プログラム"]),
    ("アプリケーション", &["アプリ"]),
    ("インフラストラクチャー", &["インフラ"]),
    ("フロントエンド", &["フロント"]),
    ("バックエンド", &["バック"]),
];

/// Bidirectional full-form/abbreviation pairs, one table per language.
///
/// English entries match case-insensitively; Japanese entries match exactly.
#[derive(Debug, Clone, Copy)]
pub struct AbbreviationTable {
    pub english: &'static [(&'static str, &'static [&'static str])],
    pub japanese: &'static [(&'static str, &'static [&'static str])],
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self {
            english: DEFAULT_ENGLISH,
            japanese: DEFAULT_JAPANESE,
        }
    }
}

impl AbbreviationTable {
    /// A table with no entries; only the structural variants are produced.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            english: &[],
            japanese: &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordPatternBuilder {
    abbreviations: AbbreviationTable,
}

impl KeywordPatternBuilder {
    #[must_use]
    pub fn new(abbreviations: AbbreviationTable) -> Self {
        Self { abbreviations }
    }

    /// Build a single regex source matching any variant of any keyword.
    ///
    /// Blank keywords are skipped; returns an empty string when nothing is
    /// left.
    #[must_use]
    pub fn generate_pattern<S: AsRef<str>>(&self, keywords: &[S]) -> String {
        let variants: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .flat_map(|k| self.variants(k))
            .collect();

        let unique = dedup(variants);
        if unique.is_empty() {
            return String::new();
        }
        format!("(?i)({})", unique.join("|"))
    }

    /// Escaped variants for one trimmed keyword, deduplicated.
    #[must_use]
    pub fn variants(&self, keyword: &str) -> Vec<String> {
        if is_japanese(keyword) {
            self.japanese_variants(keyword)
        } else {
            self.english_variants(keyword)
        }
    }

    fn english_variants(&self, keyword: &str) -> Vec<String> {
        let mut raw = vec![keyword.to_string()];

        if keyword.contains('.') {
            raw.push(keyword.replace('.', ""));
        }
        if keyword.contains(' ') {
            raw.push(keyword.replace(' ', "-"));
            raw.push(keyword.replace(' ', ""));
        }
        if keyword.contains('-') {
            raw.push(keyword.replace('-', " "));
            raw.push(keyword.replace('-', ""));
        }

        let lowered = keyword.to_lowercase();
        for (full, abbrevs) in self.abbreviations.english {
            if lowered == *full {
                raw.extend(abbrevs.iter().map(|a| (*a).to_string()));
            }
            if abbrevs.iter().any(|a| lowered == *a) {
                raw.push((*full).to_string());
            }
        }

        dedup(raw.iter().map(|v| escape_literal(v)).collect())
    }

    fn japanese_variants(&self, keyword: &str) -> Vec<String> {
        let mut raw = vec![keyword.to_string()];

        if keyword.chars().any(is_hiragana) {
            raw.push(hiragana_to_katakana(keyword));
        }
        if keyword.chars().any(is_katakana) {
            raw.push(katakana_to_hiragana(keyword));
        }

        for (full, abbrevs) in self.abbreviations.japanese {
            if keyword == *full {
                raw.extend(abbrevs.iter().map(|a| (*a).to_string()));
            }
            if abbrevs.iter().any(|a| *a == keyword) {
                raw.push((*full).to_string());
            }
        }

        dedup(raw.iter().map(|v| escape_literal(v)).collect())
    }
}

/// Backslash-escape regex metacharacters in a literal.
#[must_use]
pub fn escape_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if META_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Lenient pattern for a single keyword name: optional whitespace where the
/// name has spaces and optional dots where it has dots.
///
/// `"Next.js"` becomes `(?i)Next\.?js`. Returns `Ok(None)` for a blank name.
///
/// # Errors
///
/// Returns the [`regex::Error`] if the resulting pattern does not compile.
pub fn flexible_name_pattern(name: &str) -> Result<Option<String>, regex::Error> {
    let normalized = name.trim();
    if normalized.is_empty() {
        return Ok(None);
    }

    let pattern = format!(
        "(?i){}",
        regex::escape(normalized)
            .replace(' ', r"\s*")
            .replace(r"\.", r"\.?")
    );
    regex::Regex::new(&pattern)?;
    Ok(Some(pattern))
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn is_japanese(s: &str) -> bool {
    s.chars().any(|c| is_hiragana(c) || is_katakana(c) || is_han(c))
}

fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309F}' | '\u{1B001}'..='\u{1B11F}' | '\u{1F200}')
}

fn is_katakana(c: char) -> bool {
    matches!(
        c,
        '\u{30A1}'..='\u{30FA}'
            | '\u{30FD}'..='\u{30FF}'
            | '\u{31F0}'..='\u{31FF}'
            | '\u{32D0}'..='\u{32FE}'
            | '\u{3300}'..='\u{3357}'
            | '\u{FF66}'..='\u{FF6F}'
            | '\u{FF71}'..='\u{FF9D}'
            | '\u{1B000}'
    )
}

fn is_han(c: char) -> bool {
    matches!(
        c,
        '\u{2E80}'..='\u{2E99}'
            | '\u{2E9B}'..='\u{2EF3}'
            | '\u{2F00}'..='\u{2FD5}'
            | '\u{3005}'
            | '\u{3007}'
            | '\u{3021}'..='\u{3029}'
            | '\u{3038}'..='\u{303B}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FA6D}'
            | '\u{FA70}'..='\u{FAD9}'
            | '\u{20000}'..='\u{2FA1F}'
            | '\u{30000}'..='\u{323AF}'
    )
}

fn shift_kana(s: &str, from: std::ops::RangeInclusive<char>, up: bool) -> String {
    s.chars()
        .map(|c| {
            if !from.contains(&c) {
                return c;
            }
            let code = if up {
                u32::from(c) + KANA_OFFSET
            } else {
                u32::from(c) - KANA_OFFSET
            };
            char::from_u32(code).unwrap_or(c)
        })
        .collect()
}

fn hiragana_to_katakana(s: &str) -> String {
    shift_kana(s, '\u{3041}'..='\u{3096}', true)
}

fn katakana_to_hiragana(s: &str) -> String {
    shift_kana(s, '\u{30A1}'..='\u{30F6}', false)
}

#[cfg(test)]
#[path = "pattern_test.rs"]
mod tests;
