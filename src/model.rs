use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp layout used for `scraped_at` / `updated_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`]
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Stable identifier assigned to a record when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One scraped product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Generated when missing, so files written by older versions still load
    #[serde(default)]
    pub id: ProductId,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub name: String,

    /// Price exactly as displayed on the site
    #[serde(default)]
    pub price: String,

    #[serde(default)]
    pub benefit: String,

    /// Search keyword that produced this record
    #[serde(default)]
    pub keyword: String,

    /// Site goods number; empty when the listing had no detail link
    #[serde(default)]
    pub product_code: String,

    #[serde(default)]
    pub scraped_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Error text from the last failed refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Fields this version does not know about, kept verbatim
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Product {
    pub fn new(keyword: impl Into<String>, scraped_at: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            brand: String::new(),
            name: String::new(),
            price: String::new(),
            benefit: String::new(),
            keyword: keyword.into(),
            product_code: String::new(),
            scraped_at: scraped_at.into(),
            updated_at: None,
            status: None,
            extra: IndexMap::new(),
        }
    }

    pub fn has_code(&self) -> bool {
        !self.product_code.is_empty()
    }

    /// Whether `other` describes the same listing.
    ///
    /// Two records with product codes match on the code alone. Otherwise the
    /// listing text (brand, name, price, benefit, keyword) must be equal.
    /// Ids, timestamps and refresh status never take part.
    pub fn same_listing(&self, other: &Product) -> bool {
        if self.has_code() && other.has_code() {
            return self.product_code == other.product_code;
        }

        self.product_code == other.product_code
            && self.brand == other.brand
            && self.name == other.name
            && self.price == other.price
            && self.benefit == other.benefit
            && self.keyword == other.keyword
    }

    /// Field name / display value pairs in serialization order, without the id
    pub fn fields(&self) -> IndexMap<String, String> {
        let mut fields = IndexMap::new();
        let Ok(serde_json::Value::Object(map)) = serde_json::to_value(self) else {
            return fields;
        };

        for (key, value) in map {
            if key == "id" {
                continue;
            }
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            fields.insert(key, text);
        }
        fields
    }
}
