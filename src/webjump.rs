//! Webjumps: named url templates typed in the go-to prompt
//!
//! A webjump url may contain `%s`, replaced by the (percent-encoded) text
//! following the webjump name. Protocol webjumps (`file`, `https`, ...)
//! are completed with `://` instead of a space.

use url::Url;

/// A named url template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebJump {
    pub name: String,
    pub url: String,
    pub doc: String,
    /// Treated as the scheme part of a uri
    pub protocol: bool,
}

impl WebJump {
    pub fn allow_args(&self) -> bool {
        self.url.contains("%s")
    }

    /// The url with `%s` replaced by `arg`
    pub fn format(&self, arg: &str) -> String {
        self.url.replacen("%s", arg, 1)
    }

    /// Text put in the prompt after choosing this webjump
    pub fn completion_suffix(&self) -> &'static str {
        if self.protocol {
            "://"
        } else {
            " "
        }
    }
}

/// Webjumps by name, in definition order
#[derive(Debug, Clone, Default)]
pub struct WebJumps {
    jumps: Vec<WebJump>,
}

impl WebJumps {
    pub fn new() -> Self {
        Self::default()
    }

    /// The webjumps available out of the box
    pub fn with_defaults() -> Self {
        let mut jumps = Self::new();
        jumps.define(
            "google",
            "https://www.google.com/search?q=%s&ie=utf-8&oe=utf-8",
            "Google Search",
        );
        jumps.define(
            "duckduckgo",
            "https://www.duckduckgo.com/?q=%s",
            "DuckDuckGo Search",
        );
        jumps.define_protocol("file", "Local uris");
        jumps.define_protocol("http", "Http uris");
        jumps.define_protocol("https", "Https uris");
        jumps
    }

    /// Define or replace a webjump
    pub fn define(&mut self, name: &str, url: &str, doc: &str) {
        self.insert(WebJump {
            name: name.trim().to_string(),
            url: url.to_string(),
            doc: doc.to_string(),
            protocol: false,
        });
    }

    /// Define a protocol webjump, `name://%s`
    pub fn define_protocol(&mut self, name: &str, doc: &str) {
        self.insert(WebJump {
            name: name.trim().to_string(),
            url: format!("{}://%s", name.trim()),
            doc: doc.to_string(),
            protocol: true,
        });
    }

    fn insert(&mut self, jump: WebJump) {
        match self.jumps.iter_mut().find(|j| j.name == jump.name) {
            Some(existing) => *existing = jump,
            None => self.jumps.push(jump),
        }
    }

    pub fn get(&self, name: &str) -> Option<&WebJump> {
        self.jumps.iter().find(|j| j.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WebJump> {
        self.jumps.iter()
    }

    pub fn len(&self) -> usize {
        self.jumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jumps.is_empty()
    }

    /// The webjump named `name`, or the only one starting with it
    fn find(&self, name: &str) -> Option<&WebJump> {
        if let Some(jump) = self.get(name) {
            return Some(jump);
        }
        let mut candidates = self.jumps.iter().filter(|j| j.name.starts_with(name));
        match (candidates.next(), candidates.next()) {
            (Some(jump), None) => Some(jump),
            _ => None,
        }
    }

    /// Turn what was typed in the go-to prompt into a url
    ///
    /// `name args` and `name://args` expand the webjump (a unique prefix of
    /// the name is accepted); anything else is read as a url, with `https`
    /// as the default scheme.
    pub fn resolve(&self, value: &str) -> String {
        let value = value.trim();

        let (command, args) = match split_scheme(value) {
            Some(parts) => parts,
            None => match value.split_once(' ') {
                Some((command, args)) => (command, Some(args)),
                None => (value, None),
            },
        };

        if let Some(jump) = self.find(command) {
            if !jump.allow_args() {
                return jump.url.clone();
            }
            return match args {
                None => jump.format(""),
                Some(_) if jump.protocol => value.to_string(),
                Some(args) => jump.format(&urlencoding::encode(args)),
            };
        }

        if value.contains("://") {
            return value.to_string();
        }
        url_from_user_input(value).unwrap_or_else(|| value.to_string())
    }
}

/// `scheme://rest` split in two when the scheme has no whitespace
fn split_scheme(value: &str) -> Option<(&str, Option<&str>)> {
    let idx = value.find("://")?;
    let scheme = &value[..idx];
    if scheme.is_empty() || scheme.contains(char::is_whitespace) {
        return None;
    }
    Some((scheme, Some(&value[idx + 3..])))
}

/// Best-effort url from typed text without a scheme
fn url_from_user_input(value: &str) -> Option<String> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return None;
    }
    if value.starts_with("about:") {
        return Some(value.to_string());
    }
    if value.starts_with('/') {
        return Url::from_file_path(value).ok().map(String::from);
    }
    Url::parse(&format!("https://{}", value))
        .ok()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webjump_with_argument() {
        let jumps = WebJumps::with_defaults();
        assert_eq!(
            jumps.resolve("google rust keymap"),
            "https://www.google.com/search?q=rust%20keymap&ie=utf-8&oe=utf-8"
        );
        assert_eq!(
            jumps.resolve("duckduckgo"),
            "https://www.duckduckgo.com/?q="
        );
    }

    #[test]
    fn test_unique_prefix_selects_webjump() {
        let jumps = WebJumps::with_defaults();
        assert_eq!(jumps.resolve("duck a"), "https://www.duckduckgo.com/?q=a");
        // "h" matches both http and https
        assert_eq!(jumps.resolve("h"), "https://h/");
    }

    #[test]
    fn test_protocol_keeps_value() {
        let jumps = WebJumps::with_defaults();
        assert_eq!(jumps.resolve("file:///tmp/x"), "file:///tmp/x");
        assert_eq!(jumps.resolve("https://a.org/b"), "https://a.org/b");
    }

    #[test]
    fn test_plain_url_defaults_to_https() {
        let jumps = WebJumps::with_defaults();
        assert_eq!(jumps.resolve("  example.org "), "https://example.org/");
        assert_eq!(jumps.resolve("about:blank"), "about:blank");
        assert_eq!(jumps.resolve("two words"), "two words");
    }

    #[test]
    fn test_define_replaces() {
        let mut jumps = WebJumps::with_defaults();
        let count = jumps.len();
        jumps.define("google", "https://g.example/?q=%s", "");
        assert_eq!(jumps.len(), count);
        assert_eq!(jumps.resolve("google x"), "https://g.example/?q=x");
        assert_eq!(jumps.get("file").unwrap().completion_suffix(), "://");
    }
}
