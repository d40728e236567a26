//! Category taxonomy
//!
//! The taxonomy ships with the client so menus render without a round trip;
//! the `categories` table mirrors it for joins on the backend.

use log::warn;

use crate::error::Error;
use crate::i18n::Locale;
use crate::models::{Category, Subcategory, CATEGORIES_TABLE};
use crate::Grabi;

struct SubcategoryDef {
    slug: &'static str,
    name_fr: &'static str,
    name_en: &'static str,
}

struct CategoryDef {
    slug: &'static str,
    name_fr: &'static str,
    name_en: &'static str,
    icon: &'static str,
    subcategories: &'static [SubcategoryDef],
}

macro_rules! sub {
    ($slug:expr, $fr:expr, $en:expr) => {
        SubcategoryDef {
            slug: $slug,
            name_fr: $fr,
            name_en: $en,
        }
    };
}

static TAXONOMY: &[CategoryDef] = &[
    CategoryDef {
        slug: "vehicules",
        name_fr: "Véhicules",
        name_en: "Vehicles",
        icon: "car",
        subcategories: &[
            sub!("voitures", "Voitures", "Cars"),
            sub!("motos", "Motos & scooters", "Motorbikes & scooters"),
            sub!("pieces-auto", "Pièces & accessoires", "Parts & accessories"),
            sub!("location-vehicules", "Location de véhicules", "Vehicle rental"),
        ],
    },
    CategoryDef {
        slug: "immobilier",
        name_fr: "Immobilier",
        name_en: "Real estate",
        icon: "home",
        subcategories: &[
            sub!("appartements", "Appartements", "Apartments"),
            sub!("maisons", "Maisons & villas", "Houses & villas"),
            sub!("terrains", "Terrains", "Land"),
            sub!("bureaux-commerces", "Bureaux & commerces", "Offices & shops"),
            sub!("colocation", "Colocation", "Flat share"),
        ],
    },
    CategoryDef {
        slug: "electronique",
        name_fr: "Électronique",
        name_en: "Electronics",
        icon: "smartphone",
        subcategories: &[
            sub!("telephones", "Téléphones", "Phones"),
            sub!("ordinateurs", "Ordinateurs", "Computers"),
            sub!("tv-audio", "TV & audio", "TV & audio"),
            sub!("consoles", "Consoles & jeux vidéo", "Consoles & video games"),
            sub!("accessoires-electroniques", "Accessoires", "Accessories"),
        ],
    },
    CategoryDef {
        slug: "mode",
        name_fr: "Mode & beauté",
        name_en: "Fashion & beauty",
        icon: "shirt",
        subcategories: &[
            sub!("vetements", "Vêtements", "Clothing"),
            sub!("chaussures", "Chaussures", "Shoes"),
            sub!("montres-bijoux", "Montres & bijoux", "Watches & jewellery"),
            sub!("beaute", "Beauté & soins", "Beauty & care"),
        ],
    },
    CategoryDef {
        slug: "maison",
        name_fr: "Maison & jardin",
        name_en: "Home & garden",
        icon: "sofa",
        subcategories: &[
            sub!("meubles", "Meubles", "Furniture"),
            sub!("electromenager", "Électroménager", "Appliances"),
            sub!("decoration", "Décoration", "Decoration"),
            sub!("jardin", "Jardin & bricolage", "Garden & DIY"),
        ],
    },
    CategoryDef {
        slug: "emploi",
        name_fr: "Emploi",
        name_en: "Jobs",
        icon: "briefcase",
        subcategories: &[
            sub!("offres-emploi", "Offres d'emploi", "Job offers"),
            sub!("demandes-emploi", "Demandes d'emploi", "Job seekers"),
            sub!("stages", "Stages", "Internships"),
        ],
    },
    CategoryDef {
        slug: "services",
        name_fr: "Services",
        name_en: "Services",
        icon: "wrench",
        subcategories: &[
            sub!("cours", "Cours & formations", "Lessons & training"),
            sub!("reparations", "Réparations", "Repairs"),
            sub!("evenements", "Événements", "Events"),
            sub!("demenagement", "Déménagement & transport", "Moving & transport"),
        ],
    },
    CategoryDef {
        slug: "loisirs",
        name_fr: "Loisirs",
        name_en: "Leisure",
        icon: "ball",
        subcategories: &[
            sub!("sport", "Sport", "Sports"),
            sub!("livres", "Livres", "Books"),
            sub!("musique", "Instruments de musique", "Musical instruments"),
        ],
    },
    CategoryDef {
        slug: "animaux",
        name_fr: "Animaux",
        name_en: "Animals",
        icon: "paw",
        subcategories: &[
            sub!("chiens-chats", "Chiens & chats", "Dogs & cats"),
            sub!("betail", "Bétail", "Livestock"),
            sub!("accessoires-animaux", "Accessoires", "Accessories"),
        ],
    },
];

impl From<&CategoryDef> for Category {
    fn from(def: &CategoryDef) -> Self {
        Category {
            id: def.slug.to_string(),
            slug: def.slug.to_string(),
            name_fr: def.name_fr.to_string(),
            name_en: def.name_en.to_string(),
            icon: Some(def.icon.to_string()),
            subcategories: def
                .subcategories
                .iter()
                .map(|s| Subcategory {
                    id: s.slug.to_string(),
                    slug: s.slug.to_string(),
                    name_fr: s.name_fr.to_string(),
                    name_en: s.name_en.to_string(),
                })
                .collect(),
        }
    }
}

/// The built-in category taxonomy
pub fn taxonomy() -> Vec<Category> {
    TAXONOMY.iter().map(Category::from).collect()
}

/// Category lookups
pub struct CatalogService {
    grabi: Grabi,
    categories: Vec<Category>,
}

impl CatalogService {
    pub(crate) fn new(grabi: Grabi) -> Self {
        Self {
            grabi,
            categories: taxonomy(),
        }
    }

    /// All top-level categories
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    /// Category by slug or id
    pub fn find(&self, slug: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.slug == slug || c.id == slug)
    }

    /// Category and subcategory for a `/categorie/<slug>/<sub>` browse page
    pub fn resolve(&self, slug: &str, sub_slug: Option<&str>) -> Option<(&Category, Option<&Subcategory>)> {
        let category = self.find(slug)?;
        match sub_slug {
            Some(sub_slug) => category
                .subcategory(sub_slug)
                .map(|sub| (category, Some(sub))),
            None => Some((category, None)),
        }
    }

    /// Localized `Catégorie › Sous-catégorie` trail for a listing
    pub fn breadcrumb(
        &self,
        category_id: &str,
        subcategory_id: Option<&str>,
        locale: Locale,
    ) -> Vec<String> {
        let Some(category) = self.find(category_id) else {
            return Vec::new();
        };
        let mut trail = vec![category.name(locale).to_string()];
        if let Some(sub) = subcategory_id.and_then(|s| category.subcategory(s)) {
            trail.push(sub.name(locale).to_string());
        }
        trail
    }

    /// Read the taxonomy from the backend table
    pub async fn fetch_remote(&self) -> Result<Vec<Category>, Error> {
        let rows = self
            .grabi
            .from(CATEGORIES_TABLE)
            .select("*")
            .order("name_fr", true)
            .execute::<Category>()
            .await?;

        if rows.is_empty() {
            warn!("categories table is empty, falling back to the built-in taxonomy");
            return Ok(taxonomy());
        }
        Ok(rows)
    }
}
