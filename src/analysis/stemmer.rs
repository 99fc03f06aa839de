//! Porter stemmer.
//!
//! Suffix-stripping normalization reducing inflected English words to a
//! common root (`"running"` → `"run"`, `"relational"` → `"relat"`). The
//! measure of a stem (the number of vowel-consonant sequences it contains)
//! is tested with regular expressions over consonant/vowel runs.

use regex::Regex;

use crate::analysis::pipeline::TokenFilter;

// [C](VC)^m[V] building blocks.
// consonant sequence: [^aeiou][^aeiouy]*
// vowel sequence:     [aeiouy][aeiou]*

lazy_static::lazy_static! {
    // m > 0
    static ref MGR0: Regex =
        Regex::new(r"^([^aeiou][^aeiouy]*)?[aeiouy][aeiou]*[^aeiou][^aeiouy]*").unwrap();
    // m == 1
    static ref MEQ1: Regex = Regex::new(
        r"^([^aeiou][^aeiouy]*)?[aeiouy][aeiou]*[^aeiou][^aeiouy]*([aeiouy][aeiou]*)?$"
    )
    .unwrap();
    // m > 1
    static ref MGR1: Regex = Regex::new(
        r"^([^aeiou][^aeiouy]*)?[aeiouy][aeiou]*[^aeiou][^aeiouy]*[aeiouy][aeiou]*[^aeiou][^aeiouy]*"
    )
    .unwrap();
    // stem contains a vowel
    static ref HAS_VOWEL: Regex = Regex::new(r"^([^aeiou][^aeiouy]*)?[aeiouy]").unwrap();
    // consonant-vowel-consonant ending, last consonant not w, x or y
    static ref CVC: Regex = Regex::new(r"^[^aeiou][^aeiouy]*[aeiouy][^aeiouwxy]$").unwrap();

    static ref STEP1A_SSES_IES: Regex = Regex::new(r"^(.+?)(ss|i)es$").unwrap();
    static ref STEP1A_S: Regex = Regex::new(r"^(.+?)([^s])s$").unwrap();
    static ref STEP1B_EED: Regex = Regex::new(r"^(.+?)eed$").unwrap();
    static ref STEP1B_ED_ING: Regex = Regex::new(r"^(.+?)(ed|ing)$").unwrap();
    static ref STEP1B_AT_BL_IZ: Regex = Regex::new(r"(at|bl|iz)$").unwrap();
    static ref STEP1C: Regex = Regex::new(r"^(.+?[^aeiou])y$").unwrap();
    static ref STEP2: Regex = Regex::new(
        r"^(.+?)(ational|tional|enci|anci|izer|bli|alli|entli|eli|ousli|ization|ation|ator|alism|iveness|fulness|ousness|aliti|iviti|biliti|logi)$"
    )
    .unwrap();
    static ref STEP3: Regex =
        Regex::new(r"^(.+?)(icate|ative|alize|iciti|ical|ful|ness)$").unwrap();
    static ref STEP4: Regex = Regex::new(
        r"^(.+?)(al|ance|ence|er|ic|able|ible|ant|ement|ment|ent|ou|ism|ate|iti|ous|ive|ize)$"
    )
    .unwrap();
    static ref STEP4_ION: Regex = Regex::new(r"^(.+?)(s|t)(ion)$").unwrap();
    static ref STEP5_E: Regex = Regex::new(r"^(.+?)e$").unwrap();
    static ref STEP5_LL: Regex = Regex::new(r"ll$").unwrap();
}

fn step2_replacement(suffix: &str) -> &'static str {
    match suffix {
        "ational" => "ate",
        "tional" => "tion",
        "enci" => "ence",
        "anci" => "ance",
        "izer" => "ize",
        "bli" => "ble",
        "alli" => "al",
        "entli" => "ent",
        "eli" => "e",
        "ousli" => "ous",
        "ization" => "ize",
        "ation" => "ate",
        "ator" => "ate",
        "alism" => "al",
        "iveness" => "ive",
        "fulness" => "ful",
        "ousness" => "ous",
        "aliti" => "al",
        "iviti" => "ive",
        "biliti" => "ble",
        "logi" => "log",
        _ => "",
    }
}

fn step3_replacement(suffix: &str) -> &'static str {
    match suffix {
        "icate" => "ic",
        "alize" => "al",
        "iciti" => "ic",
        "ical" => "ic",
        // ative, ful, ness
        _ => "",
    }
}

/// Captures of `re` on `word` as owned strings, group 1 first.
fn groups(re: &Regex, word: &str) -> Option<Vec<String>> {
    re.captures(word).map(|caps| {
        caps.iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect()
    })
}

/// Ends in a doubled consonant other than l, s or z.
fn ends_with_double_consonant(word: &str) -> bool {
    let mut rev = word.chars().rev();
    match (rev.next(), rev.next()) {
        (Some(a), Some(b)) => a == b && !"aeiouylsz".contains(a),
        _ => false,
    }
}

/// Stem a single token.
pub fn stem(token: &str) -> String {
    if token.chars().count() < 3 {
        return token.to_string();
    }

    let mut w = token.to_string();

    // A leading y acts as a consonant. Upper-casing keeps it out of the
    // vowel classes until the end.
    let leading_y = w.starts_with('y');
    if leading_y {
        w.replace_range(..1, "Y");
    }

    // Step 1a
    if let Some(g) = groups(&STEP1A_SSES_IES, &w) {
        w = format!("{}{}", g[0], g[1]);
    } else if let Some(g) = groups(&STEP1A_S, &w) {
        w = format!("{}{}", g[0], g[1]);
    }

    // Step 1b
    if let Some(g) = groups(&STEP1B_EED, &w) {
        if MGR0.is_match(&g[0]) {
            w.pop();
        }
    } else if let Some(g) = groups(&STEP1B_ED_ING, &w) {
        let stem = &g[0];
        if HAS_VOWEL.is_match(stem) {
            w = stem.clone();
            if STEP1B_AT_BL_IZ.is_match(&w) {
                w.push('e');
            } else if ends_with_double_consonant(&w) {
                w.pop();
            } else if CVC.is_match(&w) {
                w.push('e');
            }
        }
    }

    // Step 1c
    if let Some(g) = groups(&STEP1C, &w) {
        w = format!("{}i", g[0]);
    }

    // Step 2
    if let Some(g) = groups(&STEP2, &w) {
        if MGR0.is_match(&g[0]) {
            w = format!("{}{}", g[0], step2_replacement(&g[1]));
        }
    }

    // Step 3
    if let Some(g) = groups(&STEP3, &w) {
        if MGR0.is_match(&g[0]) {
            w = format!("{}{}", g[0], step3_replacement(&g[1]));
        }
    }

    // Step 4
    if let Some(g) = groups(&STEP4, &w) {
        if MGR1.is_match(&g[0]) {
            w = g[0].clone();
        }
    } else if let Some(g) = groups(&STEP4_ION, &w) {
        let stem = format!("{}{}", g[0], g[1]);
        if MGR1.is_match(&stem) {
            w = stem;
        }
    }

    // Step 5
    if let Some(g) = groups(&STEP5_E, &w) {
        let stem = &g[0];
        if MGR1.is_match(stem) || (MEQ1.is_match(stem) && !CVC.is_match(stem)) {
            w = stem.clone();
        }
    }
    if STEP5_LL.is_match(&w) && MGR1.is_match(&w) {
        w.pop();
    }

    if leading_y {
        w.replace_range(..1, "y");
    }

    w
}

/// Pipeline step wrapping [`stem`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub const NAME: &'static str = "stemmer";
}

impl TokenFilter for PorterStemmer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn filter(&self, token: &str, _index: usize, _tokens: &[String]) -> Option<String> {
        Some(stem(token))
    }
}
