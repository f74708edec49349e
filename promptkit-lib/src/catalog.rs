//! Catalog types shared across the marketplace: product identifiers, store
//! platforms, and content difficulty tiers.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::PromptkitError;

/// Identifier for a purchasable product.
///
/// # Example
///
/// ```
/// use promptkit_lib::ProductId;
///
/// // Create from &str
/// let product: ProductId = "pro_plan_monthly".into();
///
/// // Or explicitly
/// let product = ProductId::new("pro_plan_yearly");
///
/// // Access the inner value
/// assert!(product.as_str().starts_with("pro_plan"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    /// Create a new ProductId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Well-known product ID for the monthly pro subscription.
    pub const PRO_MONTHLY: &'static str = "pro_plan_monthly";

    /// Well-known product ID for the yearly pro subscription.
    pub const PRO_YEARLY: &'static str = "pro_plan_yearly";

    /// Create the monthly pro plan ID.
    pub fn pro_monthly() -> Self {
        Self::new(Self::PRO_MONTHLY)
    }

    /// Create the yearly pro plan ID.
    pub fn pro_yearly() -> Self {
        Self::new(Self::PRO_YEARLY)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of products the app actually sells.
///
/// Receipt validation checks membership here; an unknown product ID is a
/// strong fraud signal but not an automatic rejection.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: HashSet<ProductId>,
}

impl ProductCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            products: HashSet::new(),
        }
    }

    /// Build a catalog from a list of product IDs.
    pub fn from_products(products: impl IntoIterator<Item = ProductId>) -> Self {
        Self {
            products: products.into_iter().collect(),
        }
    }

    /// Register a product.
    pub fn insert(&mut self, product: ProductId) {
        self.products.insert(product);
    }

    /// Check whether a product is part of the known catalog.
    pub fn contains(&self, product: &ProductId) -> bool {
        self.products.contains(product)
    }

    /// Number of known products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::from_products([ProductId::pro_monthly(), ProductId::pro_yearly()])
    }
}

/// Store platform a purchase originated from.
///
/// Serialized with the tags the platform billing layers report
/// (`"ios"`, `"android"`, `"web"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Platform {
    #[serde(rename = "ios")]
    AppStore,
    #[serde(rename = "android")]
    GooglePlay,
    #[serde(rename = "web")]
    Web,
}

impl Platform {
    /// The wire tag used by the billing layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::AppStore => "ios",
            Platform::GooglePlay => "android",
            Platform::Web => "web",
        }
    }

    /// All supported platforms.
    pub fn all() -> [Platform; 3] {
        [Platform::AppStore, Platform::GooglePlay, Platform::Web]
    }
}

impl FromStr for Platform {
    type Err = PromptkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(Platform::AppStore),
            "android" => Ok(Platform::GooglePlay),
            "web" => Ok(Platform::Web),
            other => Err(PromptkitError::invalid_data(
                "platform",
                format!("unsupported platform tag: {}", other),
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content difficulty tier.
///
/// Tiers form a fixed ordered set; only `Beginner` is accessible without an
/// active subscription. Access is binary (free vs. full), not graduated by
/// tier level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl DifficultyTier {
    /// Whether this tier is accessible without a subscription.
    pub fn is_free(&self) -> bool {
        matches!(self, DifficultyTier::Beginner)
    }

    /// All tiers, in ascending difficulty order.
    pub fn all() -> [DifficultyTier; 4] {
        [
            DifficultyTier::Beginner,
            DifficultyTier::Intermediate,
            DifficultyTier::Advanced,
            DifficultyTier::Expert,
        ]
    }
}

impl FromStr for DifficultyTier {
    type Err = PromptkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(DifficultyTier::Beginner),
            "intermediate" => Ok(DifficultyTier::Intermediate),
            "advanced" => Ok(DifficultyTier::Advanced),
            "expert" => Ok(DifficultyTier::Expert),
            other => Err(PromptkitError::invalid_data(
                "tier",
                format!("unknown difficulty tier: {}", other),
            )),
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DifficultyTier::Beginner => "beginner",
            DifficultyTier::Intermediate => "intermediate",
            DifficultyTier::Advanced => "advanced",
            DifficultyTier::Expert => "expert",
        };
        write!(f, "{}", tag)
    }
}
