//! The `nostr:` link handler template.
//!
//! The template is an external URL with placeholder tokens. Substitution
//! happens elsewhere; this module only stores the template and reports which
//! tokens it uses.

use std::fmt;
use std::str::FromStr;

/// A token recognised in a handler template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// The full `nostr:` code, without the scheme.
    Raw,
    /// The hex id or pubkey.
    Hex,
    /// `p` for profiles, `e` for events.
    PorE,
    /// `u` for users, `n` for notes.
    UorN,
    /// First relay hint.
    Relay0,
    /// Second relay hint.
    Relay1,
    /// Third relay hint.
    Relay2,
    /// The bech32 prefix (`npub`, `nevent`, ...).
    Hrp,
}

impl Placeholder {
    /// All recognised tokens.
    pub const ALL: [Placeholder; 8] = [
        Self::Raw,
        Self::Hex,
        Self::PorE,
        Self::UorN,
        Self::Relay0,
        Self::Relay1,
        Self::Relay2,
        Self::Hrp,
    ];

    /// The token name without braces.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Hex => "hex",
            Self::PorE => "p_or_e",
            Self::UorN => "u_or_n",
            Self::Relay0 => "relay0",
            Self::Relay1 => "relay1",
            Self::Relay2 => "relay2",
            Self::Hrp => "hrp",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.name())
    }
}

impl FromStr for Placeholder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Handler settings: off, or on with a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolHandlerConfig {
    enabled: bool,
    template: String,
}

impl ProtocolHandlerConfig {
    /// Disabled, with `default_template` ready to use if it is switched on.
    pub fn new(default_template: &str) -> Self {
        Self {
            enabled: false,
            template: default_template.to_string(),
        }
    }

    /// Build from the stored template. A non-empty template means enabled.
    pub fn from_stored(stored: Option<&str>, default_template: &str) -> Self {
        match stored {
            Some(template) if !template.is_empty() => Self {
                enabled: true,
                template: template.to_string(),
            },
            _ => Self::new(default_template),
        }
    }

    /// Whether `nostr:` links are handled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The URL template; empty while disabled.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replace the template.
    pub fn set_template(&mut self, template: &str) {
        self.template = template.to_string();
    }

    /// Switch handling on or off.
    ///
    /// Switching off clears the template. Switching on with an empty template
    /// installs `default_template`.
    pub fn set_enabled(&mut self, enabled: bool, default_template: &str) {
        self.enabled = enabled;
        if !enabled {
            self.template.clear();
        } else if self.template.is_empty() {
            self.template = default_template.to_string();
        }
    }

    /// The value written to storage.
    pub fn to_stored(&self) -> &str {
        if self.enabled {
            &self.template
        } else {
            ""
        }
    }

    /// Recognised placeholders the template uses, in order of appearance.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut found = Vec::new();
        for token in tokens(&self.template) {
            if let Ok(p) = token.parse::<Placeholder>() {
                if !found.contains(&p) {
                    found.push(p);
                }
            }
        }
        found
    }

    /// `{...}` tokens that are not recognised placeholders.
    pub fn unknown_tokens(&self) -> Vec<String> {
        tokens(&self.template)
            .filter(|token| token.parse::<Placeholder>().is_err())
            .map(|token| format!("{{{token}}}"))
            .collect()
    }
}

/// The names inside each `{...}` pair.
fn tokens(template: &str) -> impl Iterator<Item = &str> {
    template.split('{').skip(1).filter_map(|rest| {
        let end = rest.find('}')?;
        Some(&rest[..end])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "https://njump.me/{raw}";

    #[test]
    fn test_load_enables_on_non_empty() {
        let config = ProtocolHandlerConfig::from_stored(Some("https://x/{hex}"), DEFAULT);
        assert!(config.enabled());
        assert_eq!(config.template(), "https://x/{hex}");

        let config = ProtocolHandlerConfig::from_stored(Some(""), DEFAULT);
        assert!(!config.enabled());
        assert_eq!(config.template(), DEFAULT);
        assert_eq!(config.to_stored(), "");
    }

    #[test]
    fn test_toggle_clears_and_restores() {
        let mut config = ProtocolHandlerConfig::from_stored(Some("https://x/{hex}"), DEFAULT);
        config.set_enabled(false, DEFAULT);
        assert_eq!(config.template(), "");
        config.set_enabled(true, DEFAULT);
        assert_eq!(config.template(), DEFAULT);
        assert_eq!(config.to_stored(), DEFAULT);
    }

    #[test]
    fn test_placeholders() {
        let mut config = ProtocolHandlerConfig::new(DEFAULT);
        config.set_template("https://app/{p_or_e}/{hex}?r={relay0}&r={relay0}&x={nope}");
        assert_eq!(
            config.placeholders(),
            vec![Placeholder::PorE, Placeholder::Hex, Placeholder::Relay0]
        );
        assert_eq!(config.unknown_tokens(), vec!["{nope}".to_string()]);
        assert_eq!(Placeholder::UorN.to_string(), "{u_or_n}");
    }
}
