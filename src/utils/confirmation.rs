use chrono::NaiveDate;
use rand::Rng;

/// Generates a human-facing confirmation number: `BK-YYYYMMDD-XXXX`.
/// The suffix is Crockford base32 over random bytes, which excludes the
/// easily-confused I/L/O/U characters. Uniqueness is enforced by the
/// database index; callers regenerate on collision.
pub fn generate_confirmation_number(slot_date: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 3] = rng.gen();

    let suffix: String = base32::encode(base32::Alphabet::Crockford, &random_bytes)
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();

    format!("BK-{}-{}", slot_date.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let number = generate_confirmation_number(date);
        assert!(number.starts_with("BK-20260823-"));
        assert_eq!(number.len(), "BK-20260823-".len() + 4);
    }

    #[test]
    fn test_suffix_is_crockford_alphabet() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        for _ in 0..50 {
            let number = generate_confirmation_number(date);
            let suffix = number.rsplit('-').next().unwrap();
            for c in suffix.chars() {
                assert!(c.is_ascii_alphanumeric());
                assert!(!matches!(c, 'I' | 'L' | 'O' | 'U'), "bad char {} in {}", c, number);
            }
        }
    }
}
