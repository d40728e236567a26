//! Translated user-facing strings
//!
//! French is the marketplace's primary language; English is offered as a
//! secondary locale. Every message the services hand back to the UI is a
//! [`MessageKey`] so pages never build strings themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// French (default)
    #[default]
    Fr,

    /// English
    En,
}

impl Locale {
    /// Two-letter language code
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" | "fr-sn" => Ok(Locale::Fr),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// Identifier of a translated message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    // Payment outcome
    PaymentSuccess,
    PaymentPending,
    PaymentSessionExpired,
    PaymentCancelled,
    PaymentFailed,
    PaymentSessionNotFound,
    PaymentMissingSessionId,

    // Publication form
    TitleRequired,
    DescriptionRequired,
    PriceRequired,
    LocationRequired,
    CategoryRequired,
    ImagesRequired,
    ListingPublished,

    // Reviews
    NoReviewsYet,
    CannotReviewYourself,
    RatingOutOfRange,
    ReviewAlreadyExists,
    ReviewSubmitted,

    // Profile
    ProfileUpdated,
    ProfileNotFound,

    // Auth
    NotAuthenticated,
    InvalidCredentials,
    SessionExpired,

    // Generic
    NetworkError,
    UnexpectedError,
}

/// Translate a message key into the requested locale
pub fn translate(key: MessageKey, locale: Locale) -> &'static str {
    use MessageKey::*;

    match locale {
        Locale::Fr => match key {
            PaymentSuccess => "Paiement réussi ! Votre annonce est maintenant en ligne.",
            PaymentPending => "Votre paiement est en cours de traitement.",
            PaymentSessionExpired => "La session de paiement a expiré. Veuillez réessayer.",
            PaymentCancelled => "Le paiement a été annulé.",
            PaymentFailed => "Une erreur est survenue lors du paiement. Veuillez réessayer.",
            PaymentSessionNotFound => "Session de paiement introuvable.",
            PaymentMissingSessionId => "Identifiant de session de paiement manquant.",
            TitleRequired => "Le titre est obligatoire.",
            DescriptionRequired => "La description est obligatoire.",
            PriceRequired => "Le prix est obligatoire.",
            LocationRequired => "La localisation est obligatoire.",
            CategoryRequired => "La catégorie est obligatoire.",
            ImagesRequired => "Ajoutez au moins une photo.",
            ListingPublished => "Votre annonce a été publiée.",
            NoReviewsYet => "Aucun avis pour le moment.",
            CannotReviewYourself => "Vous ne pouvez pas vous évaluer vous-même.",
            RatingOutOfRange => "La note doit être comprise entre 1 et 5.",
            ReviewAlreadyExists => "Vous avez déjà laissé un avis pour ce vendeur.",
            ReviewSubmitted => "Merci pour votre avis !",
            ProfileUpdated => "Profil mis à jour.",
            ProfileNotFound => "Profil introuvable.",
            NotAuthenticated => "Vous devez être connecté.",
            InvalidCredentials => "Email ou mot de passe incorrect.",
            SessionExpired => "Votre session a expiré. Veuillez vous reconnecter.",
            NetworkError => "Erreur de connexion. Vérifiez votre réseau.",
            UnexpectedError => "Une erreur inattendue est survenue.",
        },
        Locale::En => match key {
            PaymentSuccess => "Payment successful! Your listing is now live.",
            PaymentPending => "Your payment is being processed.",
            PaymentSessionExpired => "The payment session has expired. Please try again.",
            PaymentCancelled => "The payment was cancelled.",
            PaymentFailed => "An error occurred during payment. Please try again.",
            PaymentSessionNotFound => "Payment session not found.",
            PaymentMissingSessionId => "Missing payment session identifier.",
            TitleRequired => "Title is required.",
            DescriptionRequired => "Description is required.",
            PriceRequired => "Price is required.",
            LocationRequired => "Location is required.",
            CategoryRequired => "Category is required.",
            ImagesRequired => "Add at least one photo.",
            ListingPublished => "Your listing has been published.",
            NoReviewsYet => "No reviews yet.",
            CannotReviewYourself => "You cannot review yourself.",
            RatingOutOfRange => "Rating must be between 1 and 5.",
            ReviewAlreadyExists => "You have already reviewed this seller.",
            ReviewSubmitted => "Thanks for your review!",
            ProfileUpdated => "Profile updated.",
            ProfileNotFound => "Profile not found.",
            NotAuthenticated => "You must be signed in.",
            InvalidCredentials => "Invalid email or password.",
            SessionExpired => "Your session has expired. Please sign in again.",
            NetworkError => "Connection error. Check your network.",
            UnexpectedError => "An unexpected error occurred.",
        },
    }
}

impl MessageKey {
    /// Shorthand for [`translate`]
    pub fn text(self, locale: Locale) -> &'static str {
        translate(self, locale)
    }
}
