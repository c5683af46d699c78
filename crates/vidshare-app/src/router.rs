use std::fmt;
use std::str::FromStr;

/// Every page of the application, addressed by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Profile,
    Listing,
    UserListing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("no page at {0}")]
    NotFound(String),
}

impl Route {
    /// `/` lands on the login page. Trailing slashes and query strings are ignored.
    pub fn parse(path: &str) -> Result<Route, RouteError> {
        let bare = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = bare.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Ok(Route::Login),
            ["register"] => Ok(Route::Register),
            ["profile"] => Ok(Route::Profile),
            ["listing"] => Ok(Route::Listing),
            ["listing", user_id] => Ok(Route::UserListing(user_id.to_string())),
            _ => Err(RouteError::NotFound(path.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Listing => "/listing".to_string(),
            Route::UserListing(user_id) => format!("/listing/{}", user_id),
        }
    }

    /// Pages that only make sense with a session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_page() {
        assert_eq!(Route::parse("/").unwrap(), Route::Login);
        assert_eq!(Route::parse("/login").unwrap(), Route::Login);
        assert_eq!(Route::parse("/register").unwrap(), Route::Register);
        assert_eq!(Route::parse("/profile/").unwrap(), Route::Profile);
        assert_eq!(Route::parse("/listing?page=2").unwrap(), Route::Listing);
        assert_eq!(
            Route::parse("/listing/65f1c0ffee").unwrap(),
            Route::UserListing("65f1c0ffee".into())
        );
    }

    #[test]
    fn path_is_inverse_of_parse() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Profile,
            Route::Listing,
            Route::UserListing("u1".into()),
        ] {
            assert_eq!(Route::parse(&route.path()).unwrap(), route);
        }
    }

    #[test]
    fn unknown_paths_are_rejected() {
        assert_eq!(
            Route::parse("/settings"),
            Err(RouteError::NotFound("/settings".into()))
        );
        assert!(Route::parse("/listing/a/b").is_err());
    }
}
