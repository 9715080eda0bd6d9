use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::debug;

use crate::domain::ports::KeyValueStore;

/// Client-side key/value storage on cookies. Values are hex encoded because
/// JSON is not cookie-safe.
pub struct CookieStore {
    cookies: Cookies,
    secure: bool,
}

impl CookieStore {
    pub fn new(cookies: Cookies, secure: bool) -> Self {
        Self { cookies, secure }
    }
}

impl KeyValueStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        let cookie = self.cookies.get(key)?;
        let bytes = hex::decode(cookie.value())
            .inspect_err(|e| debug!("Ignoring malformed cookie {}: {}", key, e))
            .ok()?;
        String::from_utf8(bytes).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let mut cookie = Cookie::new(key.to_string(), hex::encode(value));
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(Duration::days(1));
        self.cookies.add(cookie);
    }

    fn remove(&self, key: &str) {
        self.cookies.remove(Cookie::build((key.to_string(), "")).path("/").into());
    }
}
