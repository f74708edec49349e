//! Localized user-facing messages and remediation guidance.

use serde::{Deserialize, Serialize};

use crate::PurchaseErrorKind;

/// Supported UI languages. Anything unrecognized falls back to English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
    Es,
    Fr,
}

impl Locale {
    /// Parse a BCP-47-ish language tag, falling back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match primary.as_str() {
            "de" => Locale::De,
            "es" => Locale::Es,
            "fr" => Locale::Fr,
            _ => Locale::En,
        }
    }

    /// Short user-facing headline for a classified error.
    pub fn user_message(&self, kind: PurchaseErrorKind) -> &'static str {
        use PurchaseErrorKind::*;
        match (self, kind) {
            (Locale::En, UserCancelled) => "Purchase cancelled.",
            (Locale::En, PaymentMethod) => "There was a problem with your payment method.",
            (Locale::En, NetworkError) => "Connection problem. Please check your internet.",
            (Locale::En, ValidationFailed) => "We could not verify this purchase.",
            (Locale::En, BillingUnavailable) => "The store is temporarily unavailable.",
            (Locale::En, ProductUnavailable) => "This product is currently unavailable.",
            (Locale::En, ServerError) => "Something went wrong on our side.",
            (Locale::En, UnknownError) => "Something went wrong. Please try again.",

            (Locale::De, UserCancelled) => "Kauf abgebrochen.",
            (Locale::De, PaymentMethod) => "Es gab ein Problem mit Ihrer Zahlungsmethode.",
            (Locale::De, NetworkError) => {
                "Verbindungsproblem. Bitte prüfen Sie Ihre Internetverbindung."
            }
            (Locale::De, ValidationFailed) => "Der Kauf konnte nicht verifiziert werden.",
            (Locale::De, BillingUnavailable) => "Der Store ist vorübergehend nicht erreichbar.",
            (Locale::De, ProductUnavailable) => "Dieses Produkt ist derzeit nicht verfügbar.",
            (Locale::De, ServerError) => "Bei uns ist ein Fehler aufgetreten.",
            (Locale::De, UnknownError) => {
                "Etwas ist schiefgelaufen. Bitte versuchen Sie es erneut."
            }

            (Locale::Es, UserCancelled) => "Compra cancelada.",
            (Locale::Es, PaymentMethod) => "Hubo un problema con tu método de pago.",
            (Locale::Es, NetworkError) => "Problema de conexión. Comprueba tu internet.",
            (Locale::Es, ValidationFailed) => "No pudimos verificar esta compra.",
            (Locale::Es, BillingUnavailable) => "La tienda no está disponible temporalmente.",
            (Locale::Es, ProductUnavailable) => "Este producto no está disponible por ahora.",
            (Locale::Es, ServerError) => "Algo salió mal de nuestro lado.",
            (Locale::Es, UnknownError) => "Algo salió mal. Inténtalo de nuevo.",

            (Locale::Fr, UserCancelled) => "Achat annulé.",
            (Locale::Fr, PaymentMethod) => "Un problème est survenu avec votre moyen de paiement.",
            (Locale::Fr, NetworkError) => "Problème de connexion. Vérifiez votre accès internet.",
            (Locale::Fr, ValidationFailed) => "Impossible de vérifier cet achat.",
            (Locale::Fr, BillingUnavailable) => "La boutique est temporairement indisponible.",
            (Locale::Fr, ProductUnavailable) => "Ce produit est indisponible pour le moment.",
            (Locale::Fr, ServerError) => "Une erreur est survenue de notre côté.",
            (Locale::Fr, UnknownError) => "Une erreur est survenue. Veuillez réessayer.",
        }
    }
}

/// Ordered, user-actionable remediation steps for an error kind.
///
/// Every kind yields at least two steps.
pub fn guidance(kind: PurchaseErrorKind) -> Vec<&'static str> {
    use PurchaseErrorKind::*;
    match kind {
        UserCancelled => vec![
            "Tap the purchase button again when you are ready",
            "No charge was made to your account",
        ],
        PaymentMethod => vec![
            "Check that your payment method is valid and has sufficient funds",
            "Update your payment details in your store account settings",
            "Try a different payment method",
        ],
        NetworkError => vec![
            "Check your internet connection",
            "Move to an area with better signal or switch to Wi-Fi",
            "Try again in a few moments",
        ],
        ValidationFailed => vec![
            "Make sure you are signed in with the account that made the purchase",
            "Contact support with your order confirmation",
        ],
        BillingUnavailable => vec![
            "Wait a few minutes and try again",
            "Check that your device's store app is up to date",
        ],
        ProductUnavailable => vec![
            "Update the app to the latest version",
            "Contact support if the product should still be offered",
        ],
        ServerError => vec![
            "Wait a moment and try again",
            "Contact support if the problem keeps happening",
        ],
        UnknownError => vec![
            "Try the purchase again",
            "Restart the app if the problem persists",
            "Contact support if it still fails",
        ],
    }
}
