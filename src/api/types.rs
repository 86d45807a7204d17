use serde::{Deserialize, Serialize};

use super::error::ValidationError;

// ── Auth types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Sent form-encoded, not as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

// ── Catalog types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweet {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

impl Sweet {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }

    /// Advisory check run before a purchase request is sent.
    pub fn check_purchase(&self, requested: i64) -> Result<(), ValidationError> {
        if requested < 1 {
            return Err(ValidationError::QuantityTooSmall { requested });
        }
        if requested > self.quantity {
            return Err(ValidationError::InsufficientStock {
                requested,
                available: self.quantity,
            });
        }
        Ok(())
    }
}

/// Body of a create request. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweetForm {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

impl SweetForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name)?;
        check_text("category", &self.category)?;
        check_price(self.price)?;
        check_stock(self.quantity)
    }
}

/// Body of an update request. Unset fields are left out of the JSON so
/// the server only touches what was supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl SweetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_text("name", name)?;
        }
        if let Some(category) = &self.category {
            check_text("category", category)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            check_stock(quantity)?;
        }
        Ok(())
    }
}

impl From<SweetForm> for SweetUpdate {
    fn from(form: SweetForm) -> Self {
        Self {
            name: Some(form.name),
            category: Some(form.category),
            price: Some(form.price),
            quantity: Some(form.quantity),
        }
    }
}

/// Search predicates. Only the ones that are set become query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Query pairs in a fixed order: name, category, min_price, max_price.
    /// Prices use `Display`, so `10.0` is sent as `10`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

/// Payload of purchase and restock. The server names the delta field
/// after the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChange {
    pub message: String,
    pub sweet_id: i64,
    pub name: String,
    /// Stock left after the change.
    pub quantity: i64,
    #[serde(default, alias = "purchased", alias = "restocked")]
    pub changed_by: i64,
}

pub fn check_restock(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::QuantityTooSmall {
            requested: quantity,
        });
    }
    Ok(())
}

fn check_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), ValidationError> {
    // NaN fails this too.
    if !(price > 0.0 && price.is_finite()) {
        return Err(ValidationError::InvalidPrice { price });
    }
    Ok(())
}

fn check_stock(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::NegativeQuantity { quantity });
    }
    Ok(())
}
