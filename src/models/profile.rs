use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Table holding one profile per auth user
pub const PROFILES_TABLE: &str = "profiles";

/// The user-facing account record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the auth user
    pub id: String,

    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,

    /// Network name (`facebook`, `instagram`, `whatsapp`, ...) to URL or handle
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub social_links: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub email_verified: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub phone_verified: bool,

    /// Maintained server-side from `seller_reviews`
    #[serde(default)]
    pub rating_average: Option<f64>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub reviews_count: i64,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

impl Profile {
    /// Number of fields counted by [`Profile::completion_percentage`]
    pub const TRACKED_FIELDS: usize = 8;

    /// An empty profile for a user id
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            full_name: None,
            email: None,
            phone: None,
            bio: None,
            location: None,
            avatar_url: None,
            banner_url: None,
            social_links: BTreeMap::new(),
            is_verified: false,
            email_verified: false,
            phone_verified: false,
            rating_average: None,
            reviews_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    /// How many tracked fields hold a non-blank value
    pub fn filled_fields(&self) -> usize {
        let text_fields = [
            &self.full_name,
            &self.email,
            &self.phone,
            &self.bio,
            &self.location,
            &self.avatar_url,
            &self.banner_url,
        ];
        let links = self.social_links.values().any(|v| !v.trim().is_empty());

        text_fields.iter().filter(|f| filled(f)).count() + usize::from(links)
    }

    /// Share of tracked fields filled in, rounded to the nearest integer
    pub fn completion_percentage(&self) -> u8 {
        let ratio = self.filled_fields() as f64 / Self::TRACKED_FIELDS as f64;
        (ratio * 100.0).round() as u8
    }

    /// Name to show on cards, falling back to the e-mail's local part
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("Utilisateur")
            .to_string()
    }
}

/// Editable profile fields; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
}

impl ProfileUpdate {
    /// Whether nothing would be written
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(fields: &[&str]) -> Profile {
        let mut p = Profile::new("u1");
        for field in fields {
            let v = Some("x".to_string());
            match *field {
                "full_name" => p.full_name = v,
                "email" => p.email = v,
                "phone" => p.phone = v,
                "bio" => p.bio = v,
                "location" => p.location = v,
                "avatar_url" => p.avatar_url = v,
                "banner_url" => p.banner_url = v,
                "social_links" => {
                    p.social_links.insert("facebook".into(), "fb.com/x".into());
                }
                other => panic!("unknown field {}", other),
            }
        }
        p
    }

    #[test]
    fn empty_profile_is_zero_percent() {
        assert_eq!(Profile::new("u1").completion_percentage(), 0);
    }

    #[test]
    fn full_profile_is_hundred_percent() {
        let p = with(&[
            "full_name", "email", "phone", "bio", "location", "avatar_url", "banner_url",
            "social_links",
        ]);
        assert_eq!(p.completion_percentage(), 100);
    }

    #[test]
    fn partial_profiles_round_to_nearest() {
        // 1/8 = 12.5 rounds up, 3/8 = 37.5 rounds up, 5/8 = 62.5 rounds up
        assert_eq!(with(&["email"]).completion_percentage(), 13);
        assert_eq!(with(&["email", "phone", "bio"]).completion_percentage(), 38);
        assert_eq!(with(&["email", "full_name"]).completion_percentage(), 25);
        assert_eq!(
            with(&["email", "phone", "bio", "location", "avatar_url"]).completion_percentage(),
            63
        );
    }

    #[test]
    fn blank_values_do_not_count() {
        let mut p = with(&["email"]);
        p.bio = Some("   ".to_string());
        p.social_links.insert("instagram".into(), " ".into());
        assert_eq!(p.filled_fields(), 1);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut p = Profile::new("u1");
        p.email = Some("moussa.diop@example.sn".to_string());
        assert_eq!(p.display_name(), "moussa.diop");
        p.full_name = Some(" Moussa Diop ".to_string());
        assert_eq!(p.display_name(), "Moussa Diop");
    }

    #[test]
    fn null_columns_read_as_defaults() {
        let p: Profile = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "full_name": null,
            "email": "awa@example.sn",
            "phone": null,
            "bio": null,
            "location": null,
            "avatar_url": null,
            "banner_url": null,
            "social_links": null,
            "is_verified": null,
            "email_verified": null,
            "phone_verified": null,
            "rating_average": null,
            "reviews_count": null,
            "created_at": null,
            "updated_at": null
        }))
        .unwrap();

        assert!(p.social_links.is_empty());
        assert!(!p.email_verified);
        assert_eq!(p.reviews_count, 0);
        assert_eq!(p.completion_percentage(), 13);
    }
}
