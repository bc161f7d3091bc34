//! Provisional issue titles from lexical heuristics. A nicer AI-generated
//! title may overwrite these later, outside this engine.

/// Function words skipped when picking keywords from a headline.
const STOP_WORDS: &[&str] = &[
    "yang", "dan", "di", "ke", "dari", "untuk", "pada", "dengan", "oleh", "akan", "telah", "ini",
    "itu", "adalah", "sebagai",
];

const TITLE_PREFIX: &str = "Isu: ";
const MAX_KEYWORDS: usize = 4;
const FALLBACK_CHARS: usize = 50;

/// Derive a provisional issue title from a news headline: the first few
/// sufficiently long non-stop-words, capitalized, behind a fixed marker.
/// Falls back to a truncated copy of the headline when nothing qualifies.
pub fn provisional_title(news_title: &str) -> String {
    let lowered = news_title.to_lowercase();
    let keywords: Vec<String> = lowered
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > 3)
        .take(MAX_KEYWORDS)
        .map(capitalize)
        .collect();

    if keywords.is_empty() {
        let truncated: String = news_title.chars().take(FALLBACK_CHARS).collect();
        format!("{TITLE_PREFIX}{truncated}")
    } else {
        format!("{TITLE_PREFIX}{}", keywords.join(" "))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_four_long_keywords() {
        assert_eq!(
            provisional_title("Pemerintah umumkan kebijakan subsidi energi terbaru nasional"),
            "Isu: Pemerintah Umumkan Kebijakan Subsidi"
        );
    }

    #[test]
    fn drops_stop_words_and_short_words() {
        assert_eq!(
            provisional_title("Banjir di Jakarta akan meluas ke wilayah timur"),
            "Isu: Banjir Jakarta Meluas Wilayah"
        );
    }

    #[test]
    fn falls_back_to_truncated_headline() {
        // Every word is a stop word or too short.
        assert_eq!(provisional_title("Ini itu dan di ke"), "Isu: Ini itu dan di ke");
    }

    #[test]
    fn fallback_truncates_at_fifty_chars() {
        let headline = "ya ".repeat(40);
        let title = provisional_title(&headline);
        assert_eq!(
            title,
            format!("Isu: {}", headline.chars().take(50).collect::<String>())
        );
    }

    #[test]
    fn empty_headline_yields_bare_marker() {
        assert_eq!(provisional_title(""), "Isu: ");
    }
}
