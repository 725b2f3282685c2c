/// Converts a CamelCase type identifier into its display name:
/// `"AltitudeAal"` becomes `"Altitude Aal"`, `"My2BNode"` becomes
/// `"My 2B Node"`. A leading underscore admits identifiers that start
/// with a digit, so `"_1000FtInClimb"` becomes `"1000 Ft In Climb"`.
pub fn verbose_name(ident: &str) -> String {
    let ident = match ident.strip_prefix('_') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => ident,
    };
    let chars: Vec<char> = ident.chars().collect();
    let mut spaced = String::with_capacity(ident.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        let upperish = c.is_ascii_uppercase() || c.is_ascii_digit();
        let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
        let before_lower = c.is_ascii_uppercase()
            && chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
        if i > 0 && ((upperish && after_lower) || before_lower) {
            spaced.push(' ');
        }
        spaced.push(c);
    }
    title_case(&spaced)
}

/// Uppercases the first letter of each word, lowercasing the rest; digits
/// within a word restart capitalisation, so `"2b"` becomes `"2B"`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for c in word.chars() {
            if c.is_ascii_alphabetic() {
                if prev_alpha {
                    out.push(c.to_ascii_lowercase());
                } else {
                    out.push(c.to_ascii_uppercase());
                }
                prev_alpha = true;
            } else {
                out.push(c);
                prev_alpha = false;
            }
        }
        prev_alpha = false;
    }
    out
}
