use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Configuration options for the session cookie.
///
/// `max_age` only sets the cookie attribute; stored sessions never expire on
/// their own.
///
/// # Example
///
/// ```rust
/// use ruts_kv::CookieOptions;
///
/// let cookie_options = CookieOptions::build()
///         .name("test_sess")
///         .http_only(true)
///         .same_site(cookie::SameSite::Lax)
///         .secure(true)
///         .max_age(60)
///         .path("/");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CookieOptions {
    pub http_only: bool,
    pub name: &'static str,
    pub domain: Option<&'static str>,
    pub path: Option<&'static str>,
    pub same_site: SameSite,
    pub secure: bool,
    pub max_age: i64,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            name: "id",
            domain: None,
            path: None,
            same_site: SameSite::Lax,
            secure: true,
            max_age: 10 * 60,
        }
    }
}

impl CookieOptions {
    /// Creates a new `CookieOptions` with default values.
    pub fn build() -> Self {
        Self::default()
    }

    /// Sets the name of the cookie.
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn domain(mut self, domain: &'static str) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn path(mut self, path: &'static str) -> Self {
        self.path = Some(path);
        self
    }

    /// Sets the cookie's `Max-Age` in seconds.
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Builds the session cookie carrying `value`.
    pub(crate) fn session_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name, value))
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .max_age(Duration::seconds(self.max_age));

        if let Some(domain) = self.domain {
            cookie = cookie.domain(domain);
        }

        if let Some(path) = self.path {
            cookie = cookie.path(path);
        }

        cookie.build()
    }

    /// Builds the cookie used to clear the session cookie. Domain and path must
    /// match the original for browsers to drop it.
    pub(crate) fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.name);

        if let Some(domain) = self.domain {
            cookie = cookie.domain(domain);
        }

        if let Some(path) = self.path {
            cookie = cookie.path(path);
        }

        cookie.build()
    }
}
