use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::entities::{ingredient, tag};
use crate::db::services::{NewRecipe, RecipeChanges, RecipeWithRelations};
use crate::web::error::AppError;

pub const MAX_NAME_LEN: usize = 255;
/// `999.99`, the largest price with five digits and two decimal places.
pub const MAX_PRICE_CENTS: i64 = 99_999;

// --- Serializers ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub description: String,
}

impl From<RecipeWithRelations> for RecipeResponse {
    fn from(value: RecipeWithRelations) -> Self {
        RecipeDetailResponse::from(value).recipe
    }
}

impl From<RecipeWithRelations> for RecipeDetailResponse {
    fn from(value: RecipeWithRelations) -> Self {
        let RecipeWithRelations {
            recipe,
            tags,
            ingredients,
        } = value;
        Self {
            recipe: RecipeResponse {
                id: recipe.id,
                title: recipe.title,
                time_minutes: recipe.time_minutes,
                price: cents_to_price(recipe.price_cents),
                link: recipe.link,
                tags: tags.into_iter().map(TagResponse::from).collect(),
                ingredients: ingredients
                    .into_iter()
                    .map(IngredientResponse::from)
                    .collect(),
            },
            description: recipe.description,
        }
    }
}

// --- Payloads ---

/// Body of `PUT` on a tag or ingredient.
#[derive(Debug, Deserialize)]
pub struct NamePayload {
    pub name: String,
}

/// Body of `PATCH` on a tag or ingredient.
#[derive(Debug, Deserialize)]
pub struct PartialNamePayload {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NamePayload>,
    #[serde(default)]
    pub ingredients: Vec<NamePayload>,
}

/// Body of `PUT` on a recipe. Nested lists that are omitted keep their
/// current contents.
#[derive(Debug, Deserialize)]
pub struct ReplaceRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<NamePayload>>,
    pub ingredients: Option<Vec<NamePayload>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<NamePayload>>,
    pub ingredients: Option<Vec<NamePayload>>,
}

impl CreateRecipeRequest {
    pub fn into_new_recipe(self) -> Result<NewRecipe, AppError> {
        Ok(NewRecipe {
            title: validate_name("title", &self.title)?,
            description: self.description,
            time_minutes: validate_time_minutes(self.time_minutes)?,
            price_cents: price_to_cents(self.price)?,
            link: validate_link(self.link)?,
            tags: validate_names("tags", self.tags)?,
            ingredients: validate_names("ingredients", self.ingredients)?,
        })
    }
}

impl ReplaceRecipeRequest {
    pub fn into_changes(self) -> Result<RecipeChanges, AppError> {
        PatchRecipeRequest {
            title: Some(self.title),
            time_minutes: Some(self.time_minutes),
            price: Some(self.price),
            link: self.link,
            description: self.description,
            tags: self.tags,
            ingredients: self.ingredients,
        }
        .into_changes()
    }
}

impl PatchRecipeRequest {
    pub fn into_changes(self) -> Result<RecipeChanges, AppError> {
        Ok(RecipeChanges {
            title: self.title.map(|t| validate_name("title", &t)).transpose()?,
            description: self.description,
            time_minutes: self.time_minutes.map(validate_time_minutes).transpose()?,
            price_cents: self.price.map(price_to_cents).transpose()?,
            link: self.link.map(validate_link).transpose()?,
            tags: self.tags.map(|t| validate_names("tags", t)).transpose()?,
            ingredients: self
                .ingredients
                .map(|i| validate_names("ingredients", i))
                .transpose()?,
        })
    }
}

// --- Query parameters ---

#[derive(Debug, Default, Deserialize)]
pub struct AssignedOnlyQuery {
    pub assigned_only: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

// --- Validation and conversion ---

/// Trims `raw` and checks it is a usable name.
pub fn validate_name(field: &str, raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} may not be blank.")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "{field} may not exceed {MAX_NAME_LEN} characters."
        )));
    }
    Ok(name.to_owned())
}

fn validate_names(field: &str, payloads: Vec<NamePayload>) -> Result<Vec<String>, AppError> {
    payloads
        .into_iter()
        .map(|p| validate_name(field, &p.name))
        .collect()
}

fn validate_time_minutes(time_minutes: i32) -> Result<i32, AppError> {
    if time_minutes < 0 {
        return Err(AppError::InvalidInput(
            "time_minutes must be zero or greater.".to_string(),
        ));
    }
    Ok(time_minutes)
}

fn validate_link(link: String) -> Result<String, AppError> {
    let link = link.trim().to_owned();
    if link.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "link may not exceed {MAX_NAME_LEN} characters."
        )));
    }
    Ok(link)
}

/// Converts a price to whole cents. Rejects negatives, more than two decimal
/// places and anything above `999.99`.
pub fn price_to_cents(price: Decimal) -> Result<i64, AppError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::InvalidInput("price may not be negative.".to_string()));
    }
    let normalized = price.normalize();
    if normalized.scale() > 2 {
        return Err(AppError::InvalidInput(
            "price may not have more than 2 decimal places.".to_string(),
        ));
    }

    let mut scaled = normalized;
    scaled.rescale(2);
    let cents = i64::try_from(scaled.mantissa())
        .map_err(|_| AppError::InvalidInput("price is too large.".to_string()))?;
    if cents > MAX_PRICE_CENTS {
        return Err(AppError::InvalidInput(
            "price may not have more than 5 digits in total.".to_string(),
        ));
    }
    Ok(cents.abs())
}

pub fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Parses a boolean-like query flag. Integers are true when non-zero.
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, AppError> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(false);
    };
    if raw.is_empty() {
        return Ok(false);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n != 0);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::InvalidInput(format!(
            "{name} must be an integer or a boolean, got '{raw}'."
        ))),
    }
}

/// Parses a comma-separated list of ids such as `1,2,3`.
pub fn parse_id_list(name: &str, raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>().map_err(|_| {
                AppError::InvalidInput(format!("{name} must be a comma-separated list of ids."))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_price_converts_to_cents() {
        assert_eq!(price_to_cents(dec("4.5")).unwrap(), 450);
        assert_eq!(price_to_cents(dec("4.50")).unwrap(), 450);
        assert_eq!(price_to_cents(dec("7")).unwrap(), 700);
        assert_eq!(price_to_cents(dec("999.99")).unwrap(), 99_999);
        assert_eq!(price_to_cents(dec("0")).unwrap(), 0);
    }

    #[test]
    fn test_price_rejects_out_of_range_values() {
        assert!(price_to_cents(dec("-1.00")).is_err());
        assert!(price_to_cents(dec("1.234")).is_err());
        assert!(price_to_cents(dec("1000.00")).is_err());
    }

    #[test]
    fn test_cents_render_with_two_places() {
        assert_eq!(cents_to_price(450).to_string(), "4.50");
        assert_eq!(
            serde_json::to_value(cents_to_price(700)).unwrap(),
            serde_json::json!("7.00")
        );
    }

    #[test]
    fn test_flag_parsing() {
        assert!(!parse_flag("assigned_only", None).unwrap());
        assert!(!parse_flag("assigned_only", Some("")).unwrap());
        assert!(!parse_flag("assigned_only", Some("0")).unwrap());
        assert!(parse_flag("assigned_only", Some("1")).unwrap());
        assert!(parse_flag("assigned_only", Some("2")).unwrap());
        assert!(parse_flag("assigned_only", Some("True")).unwrap());
        assert!(!parse_flag("assigned_only", Some("false")).unwrap());
        assert!(parse_flag("assigned_only", Some("yes please")).is_err());
    }

    #[test]
    fn test_id_list_parsing() {
        assert!(parse_id_list("tags", None).unwrap().is_empty());
        assert_eq!(parse_id_list("tags", Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("tags", Some("4,")).unwrap(), vec![4]);
        assert!(parse_id_list("tags", Some("1,a")).is_err());
    }

    #[test]
    fn test_names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("name", "  Vegan ").unwrap(), "Vegan");
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_single_and_list_serialization_match() {
        let tag = TagResponse {
            id: 3,
            name: "Curry".into(),
        };
        let single = serde_json::to_string(&tag).unwrap();
        let list = serde_json::to_string(&vec![tag]).unwrap();
        assert_eq!(single, r#"{"id":3,"name":"Curry"}"#);
        assert_eq!(list, format!("[{single}]"));
    }

    #[test]
    fn test_patch_without_fields_changes_nothing() {
        let changes = PatchRecipeRequest::default().into_changes().unwrap();
        assert!(changes.title.is_none());
        assert!(changes.price_cents.is_none());
        assert!(changes.tags.is_none());
    }
}
