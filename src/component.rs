use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// A URL component that can be named by a `{key}` placeholder.
///
/// Keys are matched without regard to ASCII case; other case folding is not
/// applied, so a key spelled with non-ASCII letters is never recognized.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize,
)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// `{scheme}` => `https://`
    Scheme,
    /// `{userinfo}` => `user:pass@`
    Userinfo,
    /// `{host}` => `www.example.com:80`
    Host,
    /// `{hostname}` => `www.example.com`
    Hostname,
    /// `{port}` => `:80`
    Port,
    /// `{path}` => `/users/vedran/file.ext`
    Path,
    /// `{query}` => `?action=view&mode=quick`
    Query,
    /// `{fragment}` => `#top`
    Fragment,
}

impl Component {
    /// Every component, in the order they appear in a URL.
    pub const ALL: [Component; 8] = [
        Self::Scheme,
        Self::Userinfo,
        Self::Host,
        Self::Hostname,
        Self::Port,
        Self::Path,
        Self::Query,
        Self::Fragment,
    ];

    /// Recognizes the text between a pair of braces.
    pub fn from_key(key: &str) -> Option<Self> {
        if key.is_empty() || key.len() > "fragment".len() {
            return None;
        }
        key.to_ascii_lowercase().parse().ok()
    }

    pub(crate) fn expand(self, url: &Url, out: &mut String) {
        match self {
            Self::Scheme => {
                out.push_str(url.scheme());
                out.push_str("://");
            }
            Self::Userinfo => {
                out.push_str(url.username());
                if let Some(password) = url.password() {
                    out.push(':');
                    out.push_str(password);
                }
                out.push('@');
            }
            Self::Host => {
                out.push_str(url.host_str().unwrap_or_default());
                if let Some(port) = url.port() {
                    out.push(':');
                    out.push_str(&port.to_string());
                }
            }
            Self::Hostname => match url.host() {
                Some(Host::Ipv6(addr)) => out.push_str(&addr.to_string()),
                Some(_) => out.push_str(url.host_str().unwrap_or_default()),
                None => {}
            },
            Self::Port => {
                out.push(':');
                if let Some(port) = url.port() {
                    out.push_str(&port.to_string());
                }
            }
            Self::Path => out.push_str(url.path()),
            Self::Query => {
                out.push('?');
                out.push_str(url.query().unwrap_or_default());
            }
            Self::Fragment => {
                out.push('#');
                out.push_str(url.fragment().unwrap_or_default());
            }
        }
    }
}
