//! Hosted Auth Page URL Construction
//!
//! Builds the URLs the coordinator hands the host when the user should be
//! sent to the hosted sign-in or sign-up page. The destination the user
//! should return to afterwards travels inside the `state` blob; everything
//! else is a fixed path on the configured auth domain.
//!
//! The query string is assembled by plain concatenation. The base64 blob is
//! the only value ever placed there and percent-encoding its `=` padding
//! would break hosted pages that read the parameter verbatim.

use crate::state::{encode_state, HostedPage, RedirectIntent, STATE_PARAM};

/// Caller-supplied options for login/register URL construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedirectOptions {
    /// Overrides the configured default post-auth destination
    pub redirect_url: Option<String>,
    /// Asks the hosted app to open a specific page after it loads
    pub page: Option<HostedPage>,
}

impl RedirectOptions {
    /// Options with an explicit post-auth destination.
    pub fn with_redirect(url: impl Into<String>) -> Self {
        Self {
            redirect_url: Some(url.into()),
            page: None,
        }
    }
}

/// Caller-supplied options for logout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoutOptions {
    /// Where to send the user after sign-out completes. Defaults to the
    /// hosted sign-in page.
    pub redirect_url: Option<String>,
    /// Sign out locally without navigating anywhere.
    pub no_redirect: bool,
}

impl LogoutOptions {
    /// Sign out without leaving the current page.
    pub fn local_only() -> Self {
        Self {
            redirect_url: None,
            no_redirect: true,
        }
    }
}

/// URL builder for the hosted auth pages.
///
/// Pure over its inputs: the same domain, default destination and options
/// always yield the same URL, and construction never fails.
#[derive(Debug, Clone)]
pub struct HostedUrls {
    domain: String,
    default_redirect: String,
}

impl HostedUrls {
    pub fn new(domain: impl Into<String>, default_redirect: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            default_redirect: default_redirect.into(),
        }
    }

    /// URL of the hosted sign-in page.
    pub fn sign_in(&self, options: &RedirectOptions) -> String {
        self.page_url(HostedPage::SignIn, options)
    }

    /// URL of the hosted sign-up page.
    pub fn sign_up(&self, options: &RedirectOptions) -> String {
        self.page_url(HostedPage::SignUp, options)
    }

    fn page_url(&self, page: HostedPage, options: &RedirectOptions) -> String {
        let intent = RedirectIntent {
            redirect_url: options
                .redirect_url
                .clone()
                .unwrap_or_else(|| self.default_redirect.clone()),
            page: options.page,
        };

        format!(
            "https://{}/{}?{}={}",
            self.domain,
            page.path(),
            STATE_PARAM,
            encode_state(&intent)
        )
    }
}
