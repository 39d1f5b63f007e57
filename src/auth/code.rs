use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Confirmation codes act as single-factor shared secrets, so they come
/// from the OS RNG, not a seeded generator.
pub const CODE_LEN: usize = 32;

pub fn generate_confirmation_code() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_long_and_alphanumeric() {
        let code = generate_confirmation_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn codes_differ_between_calls() {
        assert_ne!(generate_confirmation_code(), generate_confirmation_code());
    }
}
