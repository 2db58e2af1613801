//! Field-level validators used by the subscription create/update DTOs.

use std::collections::HashMap;
use url::Url;
use validator::ValidationError;

const CODE_TARGET_URL_SCHEME: &str = "subscription-target-url-scheme";
const CODE_TARGET_URL_PARSE: &str = "subscription-target-url-parse";

/// `target_url` must parse as an absolute URL with an `http`/`https` scheme and a host.
pub fn subscription_target_url(val: &str) -> Result<(), ValidationError> {
    let url = Url::parse(val).map_err(|_| ValidationError {
        code: CODE_TARGET_URL_PARSE.into(),
        message: Some("target_url must be a well-formed absolute URL".into()),
        params: HashMap::new(),
    })?;

    if (url.scheme() == "http" || url.scheme() == "https") && url.has_host() {
        Ok(())
    } else {
        Err(ValidationError {
            code: CODE_TARGET_URL_SCHEME.into(),
            message: Some(
                "target_url must use the http or https scheme and include a host".into(),
            ),
            params: HashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https() {
        assert!(subscription_target_url("https://example.com/hook").is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(subscription_target_url("ftp://example.com/hook").is_err());
    }

    #[test]
    fn rejects_unparseable() {
        assert!(subscription_target_url("not a url").is_err());
    }

    #[test]
    fn rejects_hostless_url() {
        assert!(subscription_target_url("file:///etc/passwd").is_err());
    }
}
