//! Platform catalog
//!
//! Static descriptions of every channel the composer can target: identity,
//! supported post sub-types, the channel-specific option schema, and whether
//! an account is connected. The catalog is read-only; the composer only looks
//! things up in it.
//!
//! # Example
//!
//! ```
//! use libpostdeck::catalog::{ConnectionStatus, PlatformCatalog};
//!
//! let catalog = PlatformCatalog::builtin();
//! let instagram = catalog.get("instagram").unwrap();
//! assert_eq!(instagram.connection, ConnectionStatus::Connected);
//! assert!(instagram.supports_post_type("Reel"));
//! ```

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Unconnected,
}

/// Form control kind for a channel option
///
/// Each kind carries its own parse and validate strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionKind {
    Text,
    Url,
    Toggle,
    Dropdown { choices: Vec<String> },
    Users,
}

/// Value stored for a channel option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    Text(String),
    Url(String),
    Toggle(bool),
    Choice(String),
    Users(Vec<String>),
}

impl OptionKind {
    /// Parse raw user input into a value of this kind
    pub fn parse(&self, raw: &str) -> Result<OptionValue, String> {
        let value = match self {
            OptionKind::Text => OptionValue::Text(raw.to_string()),
            OptionKind::Url => OptionValue::Url(raw.trim().to_string()),
            OptionKind::Toggle => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => OptionValue::Toggle(true),
                "false" | "no" | "off" | "0" => OptionValue::Toggle(false),
                other => return Err(format!("'{}' is not a toggle value (use on/off)", other)),
            },
            OptionKind::Dropdown { .. } => OptionValue::Choice(raw.trim().to_string()),
            OptionKind::Users => OptionValue::Users(
                raw.split(',')
                    .map(|u| u.trim().trim_start_matches('@').to_string())
                    .filter(|u| !u.is_empty())
                    .collect(),
            ),
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Check that a value matches this kind
    pub fn validate(&self, value: &OptionValue) -> Result<(), String> {
        match (self, value) {
            (OptionKind::Text, OptionValue::Text(_)) => Ok(()),
            (OptionKind::Url, OptionValue::Url(url)) => {
                if url.is_empty() || url.starts_with("https://") || url.starts_with("http://") {
                    Ok(())
                } else {
                    Err(format!("'{}' is not an http(s) URL", url))
                }
            }
            (OptionKind::Toggle, OptionValue::Toggle(_)) => Ok(()),
            (OptionKind::Dropdown { choices }, OptionValue::Choice(choice)) => {
                if choices.iter().any(|c| c == choice) {
                    Ok(())
                } else {
                    Err(format!(
                        "'{}' is not one of: {}",
                        choice,
                        choices.join(", ")
                    ))
                }
            }
            (OptionKind::Users, OptionValue::Users(users)) => {
                if users.iter().any(|u| u.trim().is_empty()) {
                    Err("user handles cannot be blank".to_string())
                } else {
                    Ok(())
                }
            }
            (kind, value) => Err(format!("{:?} does not fit a {} field", value, kind.label())),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            OptionKind::Text => "text",
            OptionKind::Url => "url",
            OptionKind::Toggle => "toggle",
            OptionKind::Dropdown { .. } => "dropdown",
            OptionKind::Users => "users",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionField {
    pub id: String,
    pub label: String,
    pub kind: OptionKind,
    pub placeholder: Option<String>,
    pub default_value: Option<OptionValue>,
    pub icon_ref: String,
}

/// Static descriptor of a target channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub display_name: String,
    pub color_token: String,
    pub icon_ref: String,
    pub supported_post_types: Vec<String>,
    pub option_schema: Vec<OptionField>,
    pub connection: ConnectionStatus,
    pub account_label: String,
}

impl Platform {
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionStatus::Connected
    }

    pub fn supports_post_type(&self, post_type: &str) -> bool {
        self.supported_post_types.iter().any(|t| t == post_type)
    }

    pub fn option_field(&self, field_id: &str) -> Option<&OptionField> {
        self.option_schema.iter().find(|f| f.id == field_id)
    }
}

/// Ordered platform list: connected platforms first, then unconnected
#[derive(Debug, Clone)]
pub struct PlatformCatalog {
    platforms: Vec<Platform>,
}

static BUILTIN: OnceLock<Arc<PlatformCatalog>> = OnceLock::new();

impl PlatformCatalog {
    /// Build a catalog from an explicit list, keeping connected platforms
    /// ahead of unconnected ones
    pub fn new(mut platforms: Vec<Platform>) -> Self {
        platforms.sort_by_key(|p| !p.is_connected());
        Self { platforms }
    }

    /// Shared catalog of the platforms Postdeck ships with
    pub fn builtin() -> Arc<PlatformCatalog> {
        BUILTIN
            .get_or_init(|| Arc::new(PlatformCatalog::new(builtin_platforms())))
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn connected(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| p.is_connected())
    }

    pub fn unconnected(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| !p.is_connected())
    }
}

fn field(id: &str, label: &str, kind: OptionKind, placeholder: Option<&str>, icon: &str) -> OptionField {
    OptionField {
        id: id.to_string(),
        label: label.to_string(),
        kind,
        placeholder: placeholder.map(str::to_string),
        default_value: None,
        icon_ref: icon.to_string(),
    }
}

fn dropdown(choices: &[&str]) -> OptionKind {
    OptionKind::Dropdown {
        choices: choices.iter().map(|c| c.to_string()).collect(),
    }
}

fn platform(
    id: &str,
    display_name: &str,
    color_token: &str,
    post_types: &[&str],
    option_schema: Vec<OptionField>,
    connection: ConnectionStatus,
    account_label: &str,
) -> Platform {
    Platform {
        id: id.to_string(),
        display_name: display_name.to_string(),
        color_token: color_token.to_string(),
        icon_ref: format!("icon-{}", id),
        supported_post_types: post_types.iter().map(|t| t.to_string()).collect(),
        option_schema,
        connection,
        account_label: account_label.to_string(),
    }
}

fn builtin_platforms() -> Vec<Platform> {
    use ConnectionStatus::{Connected, Unconnected};

    vec![
        platform(
            "instagram",
            "Instagram",
            "pink-500",
            &["Post", "Reel", "Story"],
            vec![
                field("location", "Location", OptionKind::Text, Some("Add location"), "icon-pin"),
                field("collaborators", "Collaborators", OptionKind::Users, Some("@handle"), "icon-users"),
                field("first_comment", "First comment", OptionKind::Text, None, "icon-comment"),
                OptionField {
                    default_value: Some(OptionValue::Toggle(true)),
                    ..field("share_to_feed", "Also share to feed", OptionKind::Toggle, None, "icon-grid")
                },
            ],
            Connected,
            "@studio.daily",
        ),
        platform(
            "facebook",
            "Facebook",
            "blue-600",
            &["Post", "Reel", "Story"],
            vec![
                field("link", "Link", OptionKind::Url, Some("https://"), "icon-link"),
                field("location", "Location", OptionKind::Text, Some("Add location"), "icon-pin"),
            ],
            Connected,
            "Studio Daily",
        ),
        platform(
            "tiktok",
            "TikTok",
            "neutral-900",
            &["Video", "Photo"],
            vec![
                OptionField {
                    default_value: Some(OptionValue::Choice("Everyone".to_string())),
                    ..field(
                        "privacy",
                        "Who can view",
                        dropdown(&["Everyone", "Friends", "Only me"]),
                        None,
                        "icon-eye",
                    )
                },
                field("allow_comments", "Allow comments", OptionKind::Toggle, None, "icon-comment"),
                field("allow_duet", "Allow duet", OptionKind::Toggle, None, "icon-duet"),
            ],
            Connected,
            "@studiodaily",
        ),
        platform(
            "x",
            "X",
            "neutral-800",
            &[],
            vec![field(
                "reply_settings",
                "Who can reply",
                dropdown(&["Everyone", "Accounts you follow", "Only mentioned"]),
                None,
                "icon-reply",
            )],
            Connected,
            "@studiodaily",
        ),
        platform(
            "linkedin",
            "LinkedIn",
            "sky-700",
            &[],
            vec![field("link", "Link", OptionKind::Url, Some("https://"), "icon-link")],
            Connected,
            "Studio Daily Ltd.",
        ),
        platform(
            "youtube",
            "YouTube",
            "red-600",
            &["Video", "Short"],
            vec![
                field("title", "Title", OptionKind::Text, Some("Video title"), "icon-title"),
                OptionField {
                    default_value: Some(OptionValue::Choice("Public".to_string())),
                    ..field(
                        "visibility",
                        "Visibility",
                        dropdown(&["Public", "Unlisted", "Private"]),
                        None,
                        "icon-eye",
                    )
                },
                field("made_for_kids", "Made for kids", OptionKind::Toggle, None, "icon-child"),
                field("tags", "Tags", OptionKind::Text, Some("comma,separated"), "icon-tag"),
            ],
            Connected,
            "Studio Daily",
        ),
        platform(
            "pinterest",
            "Pinterest",
            "red-700",
            &["Pin"],
            vec![
                field("title", "Title", OptionKind::Text, Some("Pin title"), "icon-title"),
                field(
                    "board",
                    "Board",
                    dropdown(&["Inspiration", "Products", "Behind the scenes"]),
                    None,
                    "icon-board",
                ),
                field("destination_link", "Destination link", OptionKind::Url, Some("https://"), "icon-link"),
            ],
            Unconnected,
            "Not connected",
        ),
        platform(
            "threads",
            "Threads",
            "neutral-950",
            &[],
            vec![field("tagged_users", "Tag people", OptionKind::Users, Some("@handle"), "icon-users")],
            Unconnected,
            "Not connected",
        ),
        platform(
            "google_business",
            "Google Business Profile",
            "emerald-600",
            &["Update", "Offer", "Event"],
            vec![
                field(
                    "button",
                    "Button",
                    dropdown(&["None", "Book", "Order online", "Learn more", "Call now"]),
                    None,
                    "icon-button",
                ),
                field("button_link", "Button link", OptionKind::Url, Some("https://"), "icon-link"),
            ],
            Unconnected,
            "Not connected",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lists_connected_before_unconnected() {
        let catalog = PlatformCatalog::builtin();
        let first_unconnected = catalog
            .platforms()
            .iter()
            .position(|p| !p.is_connected())
            .expect("builtin catalog has unconnected platforms");
        assert!(catalog.platforms()[first_unconnected..]
            .iter()
            .all(|p| !p.is_connected()));
        assert_eq!(catalog.connected().count(), first_unconnected);
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let catalog = PlatformCatalog::builtin();
        let mut ids: Vec<_> = catalog.platforms().iter().map(|p| p.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_new_reorders_by_connection() {
        let catalog = PlatformCatalog::new(vec![
            platform("a", "A", "c", &[], vec![], ConnectionStatus::Unconnected, "-"),
            platform("b", "B", "c", &[], vec![], ConnectionStatus::Connected, "-"),
        ]);
        let ids: Vec<_> = catalog.platforms().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_toggle_parse() {
        assert_eq!(OptionKind::Toggle.parse("on"), Ok(OptionValue::Toggle(true)));
        assert_eq!(OptionKind::Toggle.parse("No"), Ok(OptionValue::Toggle(false)));
        assert!(OptionKind::Toggle.parse("maybe").is_err());
    }

    #[test]
    fn test_users_parse_strips_at_and_blanks() {
        let value = OptionKind::Users.parse("@ana, bob,,").unwrap();
        assert_eq!(
            value,
            OptionValue::Users(vec!["ana".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn test_url_validation() {
        assert!(OptionKind::Url.parse("https://example.com").is_ok());
        assert!(OptionKind::Url.parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_dropdown_rejects_unknown_choice() {
        let kind = dropdown(&["Public", "Private"]);
        assert_eq!(kind.parse("Public"), Ok(OptionValue::Choice("Public".to_string())));
        let err = kind.parse("Secret").unwrap_err();
        assert!(err.contains("Public, Private"));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        assert!(OptionKind::Text.validate(&OptionValue::Toggle(true)).is_err());
        assert!(OptionKind::Toggle.validate(&OptionValue::Text("on".to_string())).is_err());
    }
}
