use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

/// Table mirroring the category taxonomy
pub const CATEGORIES_TABLE: &str = "categories";

/// A second-level category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub slug: String,
    pub name_fr: String,
    pub name_en: String,
}

/// A top-level category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name_fr: String,
    pub name_en: String,
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub subcategories: Vec<Subcategory>,
}

fn localized<'a>(fr: &'a str, en: &'a str, locale: Locale) -> &'a str {
    match locale {
        Locale::Fr => fr,
        Locale::En => en,
    }
}

impl Category {
    pub fn name(&self, locale: Locale) -> &str {
        localized(&self.name_fr, &self.name_en, locale)
    }

    pub fn subcategory(&self, slug: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.slug == slug)
    }
}

impl Subcategory {
    pub fn name(&self, locale: Locale) -> &str {
        localized(&self.name_fr, &self.name_en, locale)
    }
}
