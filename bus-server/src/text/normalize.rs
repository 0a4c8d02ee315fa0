//! Locale-tolerant text folding.

/// Accented letters and their base letter.
const FOLD_TABLE: &[(char, char)] = &[
    ('á', 'a'),
    ('à', 'a'),
    ('â', 'a'),
    ('ã', 'a'),
    ('ä', 'a'),
    ('é', 'e'),
    ('è', 'e'),
    ('ê', 'e'),
    ('ë', 'e'),
    ('í', 'i'),
    ('ì', 'i'),
    ('î', 'i'),
    ('ï', 'i'),
    ('ó', 'o'),
    ('ò', 'o'),
    ('ô', 'o'),
    ('õ', 'o'),
    ('ö', 'o'),
    ('ú', 'u'),
    ('ù', 'u'),
    ('û', 'u'),
    ('ü', 'u'),
    ('ç', 'c'),
];

fn fold(c: char) -> char {
    FOLD_TABLE
        .iter()
        .find(|(accented, _)| *accented == c)
        .map_or(c, |(_, base)| *base)
}

/// Fold a string for comparison.
///
/// Lower-cases, maps accented Latin letters to their base letter, drops
/// hyphens and collapses runs of whitespace into a single space. Total over
/// any input.
///
/// ```
/// use bus_server::text::normalize;
///
/// assert_eq!(normalize("São Sebastião"), "sao sebastiao");
/// assert_eq!(normalize("  Ponta   Garça "), "ponta garca");
/// ```
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold)
        .filter(|c| *c != '-')
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
