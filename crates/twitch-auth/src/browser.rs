//! Embedded-browser capability used to obtain the token.

/// A browser that can load a URL and report navigation changes.
///
/// Navigation changes are delivered by the owner through
/// [`crate::AuthFlow::handle_url_changed`] once `observe_navigation` has been
/// called.
pub trait Browser {
    fn observe_navigation(&mut self);
    fn load_url(&mut self, url: &str);
}
