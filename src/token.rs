use uuid::Uuid;

/// Generate an opaque share token.
///
/// Tokens are the only credential a listener needs, so they must not encode
/// upload order, filename, or content. A v4 UUID rendered as a bare hex run
/// gives 122 random bits, which makes collisions negligible over any
/// realistic TTL window.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_opaque_hex() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_token()));
        }
    }
}
