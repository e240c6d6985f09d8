use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{
    CompanyId, DomainError, DomainResult, Entity, ProductId, Resource, UserId,
    error::require_non_blank,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub company_id: Option<CompanyId>,
    /// User who created the product.
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    /// Set by the handler from the caller's identity, never from the body.
    #[serde(skip)]
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub company_id: Option<CompanyId>,
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be a non-negative number"));
    }
    Ok(())
}

fn validate_stock(stock: i64) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::validation("stock must not be negative"));
    }
    Ok(())
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

impl Resource for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    const KIND: &'static str = "product";

    fn create(id: ProductId, draft: ProductDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        require_non_blank("name", &draft.name)?;
        validate_price(draft.price)?;
        validate_stock(draft.stock)?;
        Ok(Self {
            id,
            name: draft.name.trim().to_string(),
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            company_id: draft.company_id,
            created_by: draft.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(stock) = patch.stock {
            validate_stock(stock)?;
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if patch.company_id.is_some() {
            self.company_id = patch.company_id;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, price: f64, stock: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: None,
            price,
            stock,
            company_id: None,
            created_by: None,
        }
    }

    #[test]
    fn create_validates_fields() {
        let now = Utc::now();
        assert!(Product::create(ProductId::new(), draft("Widget", 9.5, 3), now).is_ok());
        assert!(Product::create(ProductId::new(), draft(" ", 9.5, 3), now).is_err());
        assert!(Product::create(ProductId::new(), draft("Widget", -1.0, 3), now).is_err());
        assert!(Product::create(ProductId::new(), draft("Widget", f64::NAN, 3), now).is_err());
        assert!(Product::create(ProductId::new(), draft("Widget", 1.0, -3), now).is_err());
    }

    #[test]
    fn created_by_is_ignored_in_json_body() {
        let body = r#"{"name":"Widget","created_by":"0191e0f4-0000-7000-8000-000000000000"}"#;
        let draft: ProductDraft = serde_json::from_str(body).unwrap();
        assert_eq!(draft.created_by, None);
    }

    #[test]
    fn patch_updates_only_supplied_fields() {
        let created = Utc::now();
        let mut product = Product::create(ProductId::new(), draft("Widget", 2.0, 1), created).unwrap();

        let later = created + chrono::Duration::seconds(5);
        product
            .apply(ProductPatch { stock: Some(10), ..Default::default() }, later)
            .unwrap();

        assert_eq!(product.name, "Widget");
        assert_eq!(product.stock, 10);
        assert_eq!(product.updated_at, later);
    }
}
