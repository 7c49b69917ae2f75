//! ISO-639 language table.
//!
//! Codes are normalized to the ISO-639-2 bibliographic form that Matroska
//! uses (`ger`, `fre`, `chi`), with terminology codes, two-letter codes and
//! English names accepted as aliases.

/// The "undetermined" language code, which also acts as a wildcard in
/// wanted-track slots.
pub const UNDETERMINED: &str = "und";

/// One row of the language table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO-639-2/B code.
    pub code: &'static str,
    /// ISO-639-2/T code when it differs from the bibliographic one.
    pub terminology: Option<&'static str>,
    /// ISO-639-1 code.
    pub alpha2: Option<&'static str>,
    /// Lowercase English names and common spellings.
    pub names: &'static [&'static str],
}

macro_rules! lang {
    ($code:literal, $alpha2:expr, [$($name:literal),+]) => {
        Language { code: $code, terminology: None, alpha2: $alpha2, names: &[$($name),+] }
    };
    ($code:literal / $term:literal, $alpha2:expr, [$($name:literal),+]) => {
        Language { code: $code, terminology: Some($term), alpha2: $alpha2, names: &[$($name),+] }
    };
}

static LANGUAGES: &[Language] = &[
    lang!("alb" / "sqi", Some("sq"), ["albanian"]),
    lang!("ara", Some("ar"), ["arabic"]),
    lang!("arm" / "hye", Some("hy"), ["armenian"]),
    lang!("aze", Some("az"), ["azerbaijani"]),
    lang!("baq" / "eus", Some("eu"), ["basque"]),
    lang!("bel", Some("be"), ["belarusian"]),
    lang!("ben", Some("bn"), ["bengali"]),
    lang!("bos", Some("bs"), ["bosnian"]),
    lang!("bul", Some("bg"), ["bulgarian"]),
    lang!("bur" / "mya", Some("my"), ["burmese"]),
    lang!("cat", Some("ca"), ["catalan"]),
    lang!("chi" / "zho", Some("zh"), ["chinese", "mandarin", "cantonese"]),
    lang!("cze" / "ces", Some("cs"), ["czech"]),
    lang!("dan", Some("da"), ["danish"]),
    lang!("dut" / "nld", Some("nl"), ["dutch", "flemish"]),
    lang!("eng", Some("en"), ["english"]),
    lang!("est", Some("et"), ["estonian"]),
    lang!("fin", Some("fi"), ["finnish"]),
    lang!("fre" / "fra", Some("fr"), ["french"]),
    lang!("geo" / "kat", Some("ka"), ["georgian"]),
    lang!("ger" / "deu", Some("de"), ["german"]),
    lang!("gre" / "ell", Some("el"), ["greek"]),
    lang!("heb", Some("he"), ["hebrew"]),
    lang!("hin", Some("hi"), ["hindi"]),
    lang!("hrv", Some("hr"), ["croatian"]),
    lang!("hun", Some("hu"), ["hungarian"]),
    lang!("ice" / "isl", Some("is"), ["icelandic"]),
    lang!("ind", Some("id"), ["indonesian"]),
    lang!("ita", Some("it"), ["italian"]),
    lang!("jpn", Some("ja"), ["japanese"]),
    lang!("kaz", Some("kk"), ["kazakh"]),
    lang!("kor", Some("ko"), ["korean"]),
    lang!("lav", Some("lv"), ["latvian"]),
    lang!("lit", Some("lt"), ["lithuanian"]),
    lang!("mac" / "mkd", Some("mk"), ["macedonian"]),
    lang!("may" / "msa", Some("ms"), ["malay"]),
    lang!("mon", Some("mn"), ["mongolian"]),
    lang!("nor", Some("no"), ["norwegian"]),
    lang!("per" / "fas", Some("fa"), ["persian", "farsi"]),
    lang!("pol", Some("pl"), ["polish"]),
    lang!("por", Some("pt"), ["portuguese"]),
    lang!("rum" / "ron", Some("ro"), ["romanian"]),
    lang!("rus", Some("ru"), ["russian"]),
    lang!("slo" / "slk", Some("sk"), ["slovak"]),
    lang!("slv", Some("sl"), ["slovenian"]),
    lang!("spa", Some("es"), ["spanish", "castilian"]),
    lang!("srp", Some("sr"), ["serbian"]),
    lang!("swe", Some("sv"), ["swedish"]),
    lang!("tam", Some("ta"), ["tamil"]),
    lang!("tha", Some("th"), ["thai"]),
    lang!("tur", Some("tr"), ["turkish"]),
    lang!("ukr", Some("uk"), ["ukrainian"]),
    lang!("urd", Some("ur"), ["urdu"]),
    lang!("uzb", Some("uz"), ["uzbek"]),
    lang!("vie", Some("vi"), ["vietnamese"]),
    lang!("wel" / "cym", Some("cy"), ["welsh"]),
];

/// Languages whose scripts make caption-count statistics meaningless.
pub const NON_LATIN_STATISTICS: &[&str] = &["chi", "jpn", "kor", "tha"];

/// Look up a language by any code or name, case-insensitively.
pub fn lookup(token: &str) -> Option<&'static Language> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }
    LANGUAGES.iter().find(|lang| {
        lang.code == token
            || lang.terminology == Some(token.as_str())
            || lang.alpha2 == Some(token.as_str())
            || lang.names.contains(&token.as_str())
    })
}

/// Look up a file-name word: three-letter codes and names only.
///
/// Two-letter codes collide with ordinary words (`it`, `no`, `be`) and are
/// not considered.
pub fn lookup_word(word: &str) -> Option<&'static Language> {
    let word = word.to_lowercase();
    LANGUAGES.iter().find(|lang| {
        lang.code == word
            || lang.terminology == Some(word.as_str())
            || lang.names.contains(&word.as_str())
    })
}

/// Normalize a raw container language tag to a table code.
///
/// Missing, empty and `non` tags become [`UNDETERMINED`]; codes the table does
/// not know are kept lowercased so nothing is silently relabeled.
pub fn normalize(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") | Some("non") => UNDETERMINED.to_string(),
        Some(tag) => lookup(tag)
            .map(|lang| lang.code.to_string())
            .unwrap_or_else(|| tag.to_lowercase()),
    }
}

/// Two-letter code for a language, as expected by bitmap subtitle tools.
pub fn alpha2(code: &str) -> Option<&'static str> {
    lookup(code).and_then(|lang| lang.alpha2)
}

/// Whether `code` is the undetermined wildcard.
pub fn is_undetermined(code: &str) -> bool {
    code == UNDETERMINED
}
