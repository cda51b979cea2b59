use chrono::Utc;
use rand::Rng;

/// Unique human-quotable payment reference, e.g. "PAY-1714650000123-482913".
pub fn generate_payment_reference() -> String {
    let mut rng = rand::rng();
    format!(
        "PAY-{}-{}",
        Utc::now().timestamp_millis(),
        rng.random_range(100000..999999)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_format() {
        let reference = generate_payment_reference();
        assert!(reference.starts_with("PAY-"));
        assert_eq!(reference.split('-').count(), 3);
    }
}
