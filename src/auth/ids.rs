use rand::{distributions::Alphanumeric, Rng};

const ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a display identifier like `ANX-7F2K-Q9B3`. Uniqueness is the
/// caller's job; see the registration flow.
pub fn generate_anonimax_id() -> String {
    let mut rng = rand::thread_rng();
    let mut block = || -> String {
        (0..4)
            .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
            .collect()
    };
    let a = block();
    let b = block();
    format!("ANX-{a}-{b}")
}

/// Opaque token for email verification / password reset links.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonimax_id_has_expected_shape() {
        let id = generate_anonimax_id();
        assert_eq!(id.len(), 13);
        assert!(id.starts_with("ANX-"));
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts, vec!["ANX", &id[4..8], &id[9..13]]);
        for c in id[4..].chars().filter(|c| *c != '-') {
            assert!(c.is_ascii_uppercase() || c.is_ascii_digit(), "bad char {c}");
        }
    }

    #[test]
    fn tokens_are_long_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
