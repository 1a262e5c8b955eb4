use domain::Identity;

/// Whatever the connection presented to prove who it is.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// The site's login layer. This subsystem never checks passwords itself; it
/// only asks whether a connection carries an identity.
pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Option<Identity>;
}
