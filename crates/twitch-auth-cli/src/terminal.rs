//! Terminal stand-in for an embedded browser.
//!
//! The authorization URL is printed for the user to open; the URL the
//! browser lands on afterwards is pasted back on stdin.

use twitch_auth::Browser;

#[derive(Debug, Default)]
pub struct TerminalBrowser {
    observing: bool,
}

impl TerminalBrowser {
    pub fn is_observing(&self) -> bool {
        self.observing
    }
}

impl Browser for TerminalBrowser {
    fn observe_navigation(&mut self) {
        self.observing = true;
    }

    fn load_url(&mut self, url: &str) {
        tracing::info!(url, "Opening Twitch authorization page");
        println!("Open this URL in your browser and log in:\n\n  {url}\n");
        println!("Then paste the address of each page you land on (the last one carries the token):");
    }
}
