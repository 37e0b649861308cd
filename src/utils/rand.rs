use rand::distr::{Alphanumeric, SampleString};

/// Random alphanumeric text for fixture titles.
pub fn rand_str(length: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), length)
}

/// A fresh owner id, so fixtures sharing one database never see each other's rows.
pub fn rand_user_id() -> String {
    format!("user-{}", rand_str(8).to_lowercase())
}

/// An absolute URL on a random host.
pub fn rand_url() -> String {
    format!("https://{}.example/{}", rand_str(10).to_lowercase(), rand_str(6))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::parse_url;

    #[test]
    fn fixtures_are_distinct() {
        let title = rand_str(10);
        assert_eq!(title.len(), 10);
        assert!(title.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(rand_user_id(), rand_user_id());
    }

    #[test]
    fn urls_are_valid() {
        let url = rand_url();
        assert!(parse_url(&url).is_ok(), "{url} should parse");
        assert_ne!(url, rand_url());
    }
}
