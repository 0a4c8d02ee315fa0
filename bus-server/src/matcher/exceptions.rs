//! Stop names whose cedilla is routinely lost by clients.
//!
//! Some clients send these names with a plain `c`. Matching is done on
//! normalised text, where `ç` and `c` are the same letter, so the table only
//! restores the display form echoed back to the caller and sent to the
//! directions provider.

/// Normalised query text and the display name it stands for.
const CEDILLA_EXCEPTIONS: &[(&str, &str)] = &[
    ("povoacao", "Povoação"),
    ("lomba do loucao", "Lomba do Loução"),
    ("ponta garca", "Ponta Garça"),
];

/// Display name for an exact normalised match in the exception table.
pub fn restore_diacritics(normalized: &str) -> Option<&'static str> {
    CEDILLA_EXCEPTIONS
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, display)| *display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    #[test]
    fn known_names() {
        assert_eq!(restore_diacritics("povoacao"), Some("Povoação"));
        assert_eq!(restore_diacritics("ponta garca"), Some("Ponta Garça"));
        assert_eq!(restore_diacritics("lomba do loucao"), Some("Lomba do Loução"));
    }

    #[test]
    fn exact_key_only() {
        assert_eq!(restore_diacritics("povoacao de cima"), None);
        assert_eq!(restore_diacritics("Povoacao"), None);
        assert_eq!(restore_diacritics("lagoa"), None);
    }

    #[test]
    fn keys_are_normalised_displays() {
        for (key, display) in CEDILLA_EXCEPTIONS {
            assert_eq!(normalize(display), *key);
        }
    }
}
