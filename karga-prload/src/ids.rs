use rand::{seq::SliceRandom, Rng};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const SUFFIX_LEN: usize = 8;

/// Lowercase alphanumeric identifier of `len` characters.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| *ALPHABET.choose(rng).unwrap_or(&b'0') as char)
        .collect()
}

pub fn team_name(suffix: &str) -> String {
    format!("team-{suffix}")
}

pub fn member_ids(team_name: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("user-{team_name}-{i}")).collect()
}

pub fn member_username(index: usize) -> String {
    format!("User {index}")
}

pub fn pull_request_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("pr-{}", random_id(rng, SUFFIX_LEN))
}

pub fn merge_pull_request_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("pr-merge-{}", random_id(rng, SUFFIX_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_id_uses_lowercase_alphanumerics() {
        let mut rng = rand::thread_rng();
        let id = random_id(&mut rng, 32);
        assert_eq!(id.len(), 32);
        assert!(id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn member_ids_are_derived_from_team() {
        let members = member_ids("team-abc", 3);
        assert_eq!(
            members,
            vec!["user-team-abc-0", "user-team-abc-1", "user-team-abc-2"]
        );
        assert_eq!(member_username(2), "User 2");
    }

    #[test]
    fn pull_request_ids_are_prefixed() {
        let mut rng = rand::thread_rng();
        assert!(pull_request_id(&mut rng).starts_with("pr-"));
        let merge = merge_pull_request_id(&mut rng);
        assert!(merge.starts_with("pr-merge-"));
        assert_eq!(merge.len(), "pr-merge-".len() + SUFFIX_LEN);
    }
}
