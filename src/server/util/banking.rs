//! Finnish payment conventions: reference numbers, IBAN and VAT rates.

/// Current Finnish VAT rates, percent. General rate was 24 until 2024-09-01.
pub const STANDARD_VAT_RATES: [f64; 4] = [0.0, 10.0, 14.0, 25.5];
pub const PREVIOUS_GENERAL_VAT_RATE: f64 = 24.0;

const REFERENCE_WEIGHTS: [u32; 3] = [7, 3, 1];

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Check digit of a viitenumero base (3..=19 digits), weights 7-3-1 from the right.
pub fn reference_check_digit(base: &str) -> Option<u32> {
    let base = strip_whitespace(base);
    if !(3..=19).contains(&base.len()) {
        return None;
    }
    let mut sum = 0;
    for (i, ch) in base.chars().rev().enumerate() {
        sum += ch.to_digit(10)? * REFERENCE_WEIGHTS[i % 3];
    }
    Some((10 - sum % 10) % 10)
}

/// Append the check digit to a base, e.g. `1234561` -> `12345614`.
pub fn create_reference(base: &str) -> Option<String> {
    let digit = reference_check_digit(base)?;
    Some(format!("{}{digit}", strip_whitespace(base)))
}

pub fn is_valid_reference(reference: &str) -> bool {
    let reference = strip_whitespace(reference);
    if !(4..=20).contains(&reference.len()) || !reference.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let (base, check) = reference.split_at(reference.len() - 1);
    // leading zeros carry no information and banks reject them
    if base.starts_with('0') {
        return false;
    }
    reference_check_digit(base) == check.chars().next().and_then(|c| c.to_digit(10))
}

/// Groups of five counted from the right: `123 45614`
pub fn format_reference(reference: &str) -> String {
    group_from_right(&strip_whitespace(reference), 5)
}

fn group_from_right(s: &str, size: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let head = chars.len() % size;
    let mut out = String::with_capacity(chars.len() + chars.len() / size);
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (i + size - head) % size == 0 {
            out.push(' ');
        }
        out.push(*ch);
    }
    out
}

/// ISO 13616 mod-97 check
pub fn is_valid_iban(iban: &str) -> bool {
    let iban = strip_whitespace(iban).to_ascii_uppercase();
    if !(15..=34).contains(&iban.len()) || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (country, rest) = iban.split_at(2);
    if !country.chars().all(|c| c.is_ascii_alphabetic())
        || !rest[..2].chars().all(|c| c.is_ascii_digit())
    {
        return false;
    }
    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;
    for ch in rearranged {
        // base 36 maps A..Z to 10..35, two decimal digits each
        let Some(value) = ch.to_digit(36) else {
            return false;
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    remainder == 1
}

/// Groups of four from the left: `FI21 1234 5600 0007 85`
pub fn format_iban(iban: &str) -> String {
    strip_whitespace(iban)
        .to_ascii_uppercase()
        .chars()
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_standard_vat_rate(rate: f64) -> bool {
    STANDARD_VAT_RATES.contains(&rate) || rate == PREVIOUS_GENERAL_VAT_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_check_digits() {
        assert_eq!(reference_check_digit("1234561"), Some(4));
        assert_eq!(reference_check_digit("100"), Some(9));
        assert_eq!(reference_check_digit("2023 001"), Some(2));
        assert_eq!(reference_check_digit("12"), None);
        assert_eq!(reference_check_digit("12a4"), None);
        assert_eq!(create_reference("123").as_deref(), Some("1232"));
    }

    #[test]
    fn validates_references() {
        assert!(is_valid_reference("12345614"));
        assert!(is_valid_reference("123 45614"));
        assert!(is_valid_reference("1009"));
        assert!(!is_valid_reference("12345615"));
        assert!(!is_valid_reference("123"));
        assert!(!is_valid_reference("01009"));
        assert!(!is_valid_reference("RF18539007547034"));
        assert!(!is_valid_reference(""));
    }

    #[test]
    fn formats_references() {
        assert_eq!(format_reference("12345614"), "123 45614");
        assert_eq!(format_reference("1232"), "1232");
        assert_eq!(format_reference("1234567890"), "12345 67890");
    }

    #[test]
    fn validates_ibans() {
        assert!(is_valid_iban("FI2112345600000785"));
        assert!(is_valid_iban("fi21 1234 5600 0007 85"));
        assert!(is_valid_iban("DE89370400440532013000"));
        assert!(!is_valid_iban("FI2112345600000786"));
        assert!(!is_valid_iban("FI21"));
        assert!(!is_valid_iban("1121123456000007"));
        assert!(!is_valid_iban("FI21-12345600000785"));
    }

    #[test]
    fn formats_ibans() {
        assert_eq!(format_iban("FI2112345600000785"), "FI21 1234 5600 0007 85");
        assert_eq!(format_iban("fi21 1234 5600 0007 85"), "FI21 1234 5600 0007 85");
    }

    #[test]
    fn vat_rates() {
        assert!(is_standard_vat_rate(25.5));
        assert!(is_standard_vat_rate(24.0));
        assert!(is_standard_vat_rate(0.0));
        assert!(!is_standard_vat_rate(12.0));
    }
}
