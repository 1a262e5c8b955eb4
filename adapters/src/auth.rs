use application::ports::out_::{Authenticator, Credentials};
use domain::Identity;

const DEFAULT_USERNAME: &str = "Guest";

/// Trusts the `user_id`/`username` pair the site's login layer put on the
/// connection URL. A blank or missing `user_id` is no identity at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryAuthenticator;

impl Authenticator for QueryAuthenticator {
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Option<Identity> {
        let user_id = credentials
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        let username = credentials
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_USERNAME);
        Some(Identity::new(user_id, username))
    }
}
