//! Category and product rules.

use crate::error::CoreError;
use crate::types::Money;

/// Maximum length of a category, subcategory, or product name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a SKU.
pub const MAX_SKU_LENGTH: usize = 64;

text_enum! {
    /// Publication state of a product.
    pub enum ProductStatus("product status") {
        Draft => "draft",
        Active => "active",
        Archived => "archived",
    }
}

text_enum! {
    /// Sort orders accepted by the product list.
    pub enum ProductSort("product sort") {
        Newest => "newest",
        PriceAsc => "price_asc",
        PriceDesc => "price_desc",
        Name => "name",
    }
}

impl ProductSort {
    /// `ORDER BY` fragment over the `p` (products) alias. Always ends with
    /// `id` for stable paging.
    pub fn order_by(self) -> &'static str {
        match self {
            ProductSort::Newest => "p.created_at DESC, p.id DESC",
            ProductSort::PriceAsc => "p.price ASC, p.id ASC",
            ProductSort::PriceDesc => "p.price DESC, p.id DESC",
            ProductSort::Name => "p.name ASC, p.id ASC",
        }
    }
}

/// Derive a URL slug: lowercase ASCII alphanumeric runs joined by `-`.
///
/// Non-ASCII and punctuation act as separators. Fails when nothing usable
/// remains (e.g. a name made only of symbols).
pub fn slugify(name: &str) -> Result<String, CoreError> {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        return Err(CoreError::Validation(format!(
            "Name '{name}' does not produce a usable slug"
        )));
    }
    Ok(slug)
}

/// Names must be non-blank and bounded.
pub fn validate_name(name: &str, field: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Prices are non-negative minor units.
pub fn validate_price(price: Money) -> Result<(), CoreError> {
    if price < 0 {
        return Err(CoreError::Validation("Price must not be negative".to_string()));
    }
    Ok(())
}

/// Stock levels are non-negative.
pub fn validate_stock(stock: i32) -> Result<(), CoreError> {
    if stock < 0 {
        return Err(CoreError::Validation("Stock must not be negative".to_string()));
    }
    Ok(())
}

/// SKUs are 1-64 characters of ASCII letters, digits, `-`, or `_`.
pub fn validate_sku(sku: &str) -> Result<(), CoreError> {
    if sku.is_empty() || sku.len() > MAX_SKU_LENGTH {
        return Err(CoreError::Validation(format!(
            "SKU must be 1-{MAX_SKU_LENGTH} characters"
        )));
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Invalid SKU '{sku}'. Only letters, digits, '-' and '_' are allowed"
        )));
    }
    Ok(())
}

/// Validate an optional `[min, max]` price filter.
pub fn validate_price_range(min: Option<Money>, max: Option<Money>) -> Result<(), CoreError> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(CoreError::Validation(
                "min_price must not exceed max_price".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Home & Garden").unwrap(), "home-garden");
        assert_eq!(slugify("  Men's   Shoes ").unwrap(), "men-s-shoes");
        assert_eq!(slugify("TVs 4K").unwrap(), "tvs-4k");
    }

    #[test]
    fn test_slugify_strips_non_ascii() {
        assert_eq!(slugify("Café Crème").unwrap(), "caf-cr-me");
    }

    #[test]
    fn test_slugify_rejects_symbol_only() {
        assert!(slugify("***").is_err());
        assert!(slugify("").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Electronics", "name").is_ok());
        assert!(validate_name("  ", "name").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH + 1), "name").is_err());
    }

    #[test]
    fn test_price_and_stock() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
    }

    #[test]
    fn test_sku_rules() {
        assert!(validate_sku("TSHIRT-RED_XL").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(MAX_SKU_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_price_range() {
        assert!(validate_price_range(Some(100), Some(200)).is_ok());
        assert!(validate_price_range(None, Some(200)).is_ok());
        assert!(validate_price_range(Some(300), Some(200)).is_err());
    }

    #[test]
    fn test_sort_order_is_stable() {
        for sort in ProductSort::ALL {
            assert!(sort.order_by().contains("id"));
        }
        assert_eq!("price_desc".parse::<ProductSort>().unwrap(), ProductSort::PriceDesc);
    }
}
