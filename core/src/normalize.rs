//! Search normalization for Arabic text

/// Strip diacritics and fold orthographic variants so that corpus text and
/// user queries compare equal regardless of vocalization.
///
/// Steps, in order:
/// 1. drop harakat, tanwin, superscript alif and Quranic annotation marks
/// 2. fold alif with hamza above/below and alif madda to bare alif
/// 3. fold teh marbuta to heh
/// 4. fold alif maksura to yeh
/// 5. trim surrounding whitespace
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| !is_diacritic(*c))
        .map(fold_letter)
        .collect();
    folded.trim().to_string()
}

/// Combining marks removed before comparison
fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

fn fold_letter(c: char) -> char {
    match c {
        'أ' | 'إ' | 'آ' => 'ا',
        'ة' => 'ه',
        'ى' => 'ي',
        _ => c,
    }
}
