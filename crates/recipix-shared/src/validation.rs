//! Field-level validation for everything a client can submit.
//!
//! Checks run in a fixed order and the first failure wins, so a given bad
//! submission always produces the same message. Nothing here touches
//! storage: callers validate first and only then open a transaction.

use std::collections::HashSet;

use serde_json::Value;

use crate::constants::{
    MAX_NOTES_LEN, MAX_STEPS_LEN, MAX_TITLE_LEN, MAX_UNIT_LEN, PREPARATION_TIME_RANGE,
    RATING_RANGE, SERVINGS_RANGE,
};
use crate::error::ValidationError;
use crate::types::{IngredientEntry, RatingUpdate, RawRecipe, RecipeInput};

/// Validate a full recipe submission.
pub fn validate_recipe(raw: &RawRecipe) -> Result<RecipeInput, ValidationError> {
    let required = [
        raw.title.as_ref(),
        raw.preparation_time.as_ref(),
        raw.servings.as_ref(),
        raw.steps.as_ref(),
        raw.ingredients.as_ref(),
    ];
    if !required.into_iter().all(is_present) {
        return Err(ValidationError::MissingFields);
    }

    let title = bounded_text(raw.title.as_ref(), MAX_TITLE_LEN)
        .ok_or(ValidationError::InvalidTitle)?;
    let steps = bounded_text(raw.steps.as_ref(), MAX_STEPS_LEN)
        .ok_or(ValidationError::InvalidSteps)?;

    let image_path = raw
        .image_path
        .as_deref()
        .filter(|path| !path.is_empty())
        .ok_or(ValidationError::MissingImage)?
        .to_string();

    let preparation_time = raw
        .preparation_time
        .as_ref()
        .and_then(parse_integer)
        .filter(|n| PREPARATION_TIME_RANGE.contains(n))
        .ok_or(ValidationError::InvalidPreparationTime)?;
    let servings = raw
        .servings
        .as_ref()
        .and_then(parse_integer)
        .filter(|n| SERVINGS_RANGE.contains(n))
        .ok_or(ValidationError::InvalidServings)?;

    let ingredients = parse_ingredients(raw.ingredients.as_ref())?;

    Ok(RecipeInput {
        title,
        // Both values were range-checked above.
        preparation_time: preparation_time as u32,
        servings: servings as u32,
        steps,
        image_path,
        ingredients,
    })
}

/// Validate an ingredient name and return it trimmed.
pub fn validate_ingredient_name(value: Option<&Value>) -> Result<String, ValidationError> {
    value
        .and_then(Value::as_str)
        .and_then(ingredient_name)
        .ok_or(ValidationError::InvalidIngredientName)
}

/// Validate a `{rating, notes}` body.
pub fn validate_rating_update(body: &Value) -> Result<RatingUpdate, ValidationError> {
    let rating = body
        .get("rating")
        .and_then(parse_integer)
        .filter(|n| RATING_RANGE.contains(n))
        .ok_or(ValidationError::InvalidRating)?;

    let notes = match body.get("notes") {
        notes if !is_present(notes) => None,
        Some(Value::String(text)) if text.chars().count() <= MAX_NOTES_LEN => Some(text.clone()),
        _ => return Err(ValidationError::InvalidNotes),
    };

    Ok(RatingUpdate {
        rating: rating as u8,
        notes,
    })
}

/// Validate a `{favorite}` body.
pub fn validate_favorite(body: &Value) -> Result<bool, ValidationError> {
    body.get("favorite")
        .and_then(Value::as_bool)
        .ok_or(ValidationError::InvalidFavorite)
}

fn parse_ingredients(value: Option<&Value>) -> Result<Vec<IngredientEntry>, ValidationError> {
    let decoded;
    let value = match value {
        Some(Value::String(text)) => {
            decoded = serde_json::from_str::<Value>(text)
                .map_err(|_| ValidationError::InvalidIngredients)?;
            &decoded
        }
        Some(other) => other,
        None => return Err(ValidationError::InvalidIngredients),
    };

    let items = value
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or(ValidationError::InvalidIngredients)?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let entry = ingredient_entry(item).ok_or(ValidationError::InvalidIngredients)?;
        if !seen.insert(entry.name.clone()) {
            return Err(ValidationError::DuplicateIngredient(entry.name));
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn ingredient_entry(item: &Value) -> Option<IngredientEntry> {
    let object = item.as_object()?;

    let name = object.get("name").and_then(Value::as_str).and_then(ingredient_name)?;

    let quantity = object
        .get("quantity")
        .and_then(Value::as_f64)
        .filter(|q| q.is_finite() && *q > 0.0)?;

    let unit = object.get("unit").and_then(Value::as_str)?;
    if unit.trim().is_empty() || unit.chars().count() > MAX_UNIT_LEN {
        return None;
    }

    Some(IngredientEntry {
        name,
        quantity,
        unit: unit.trim().to_string(),
    })
}

fn ingredient_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || !trimmed.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(trimmed.to_string())
}

/// A string field that is non-blank and at most `max` characters long,
/// returned trimmed.
fn bounded_text(value: Option<&Value>, max: usize) -> Option<String> {
    let text = value?.as_str()?;
    if text.trim().is_empty() || text.chars().count() > max {
        return None;
    }
    Some(text.trim().to_string())
}

/// Whether a field counts as supplied. Blank strings, `null`, `false` and
/// zero all count as missing.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// Accept either a JSON number or a numeric string, as long as it denotes a
/// whole number.
fn parse_integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() || number.fract() != 0.0 || number.abs() > i64::MAX as f64 {
        return None;
    }
    Some(number as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn soup() -> RawRecipe {
        RawRecipe {
            title: Some(json!("Soup")),
            preparation_time: Some(json!("30")),
            servings: Some(json!("4")),
            steps: Some(json!("Boil.")),
            ingredients: Some(json!(r#"[{"name":"Salt","quantity":1,"unit":"tsp"}]"#)),
            image_path: Some("uploads/soup.jpg".to_string()),
        }
    }

    #[test]
    fn test_valid_submission() {
        let input = validate_recipe(&soup()).unwrap();
        assert_eq!(input.title, "Soup");
        assert_eq!(input.preparation_time, 30);
        assert_eq!(input.servings, 4);
        assert_eq!(input.image_path, "uploads/soup.jpg");
        assert_eq!(
            input.ingredients,
            vec![IngredientEntry {
                name: "Salt".into(),
                quantity: 1.0,
                unit: "tsp".into(),
            }]
        );
    }

    #[test]
    fn test_ingredients_as_array() {
        let mut raw = soup();
        raw.ingredients = Some(json!([
            {"name": "  Salt ", "quantity": 0.5, "unit": " tsp "},
            {"name": "Paprika", "quantity": 2, "unit": "g"},
        ]));
        let input = validate_recipe(&raw).unwrap();
        assert_eq!(input.ingredients.len(), 2);
        assert_eq!(input.ingredients[0].name, "Salt");
        assert_eq!(input.ingredients[0].unit, "tsp");
        assert_eq!(input.ingredients[1].name, "Paprika");
    }

    #[test]
    fn test_missing_field_reported_first() {
        let mut raw = soup();
        raw.steps = None;
        raw.title = Some(json!(42));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::MissingFields));

        let mut raw = soup();
        raw.servings = Some(json!(""));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_title_rules() {
        let mut raw = soup();
        raw.title = Some(json!("   "));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::InvalidTitle));

        raw.title = Some(json!("x".repeat(101)));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::InvalidTitle));

        raw.title = Some(json!("é".repeat(100)));
        assert!(validate_recipe(&raw).is_ok());
    }

    #[test]
    fn test_steps_rules() {
        let mut raw = soup();
        raw.steps = Some(json!("s".repeat(1001)));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::InvalidSteps));
    }

    #[test]
    fn test_image_checked_before_numbers() {
        let mut raw = soup();
        raw.image_path = None;
        raw.preparation_time = Some(json!("abc"));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::MissingImage));
    }

    #[test]
    fn test_preparation_time_bounds() {
        let mut raw = soup();
        for bad in [json!("1001"), json!("-5"), json!("2.5"), json!("soon")] {
            raw.preparation_time = Some(bad);
            assert_eq!(
                validate_recipe(&raw),
                Err(ValidationError::InvalidPreparationTime)
            );
        }
        raw.preparation_time = Some(json!(1000));
        assert!(validate_recipe(&raw).is_ok());
        raw.preparation_time = Some(json!("15.0"));
        assert_eq!(validate_recipe(&raw).unwrap().preparation_time, 15);
    }

    #[test]
    fn test_servings_bounds() {
        let mut raw = soup();
        raw.servings = Some(json!(101));
        assert_eq!(validate_recipe(&raw), Err(ValidationError::InvalidServings));
        raw.servings = Some(json!(" 100 "));
        assert_eq!(validate_recipe(&raw).unwrap().servings, 100);
    }

    #[test]
    fn test_bad_ingredient_lists() {
        let cases = [
            json!("not json"),
            json!("[]"),
            json!({"name": "Salt"}),
            json!([{"name": "123", "quantity": 1, "unit": "g"}]),
            json!([{"name": "Salt", "quantity": "1", "unit": "g"}]),
            json!([{"name": "Salt", "quantity": 0, "unit": "g"}]),
            json!([{"name": "Salt", "quantity": 1, "unit": "  "}]),
            json!([{"name": "Salt", "quantity": 1, "unit": "u".repeat(21)}]),
            json!([{"name": "Salt", "quantity": 1}]),
        ];
        for case in cases {
            let mut raw = soup();
            raw.ingredients = Some(case.clone());
            assert_eq!(
                validate_recipe(&raw),
                Err(ValidationError::InvalidIngredients),
                "case {case}"
            );
        }
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let mut raw = soup();
        raw.ingredients = Some(json!([
            {"name": "Salt", "quantity": 1, "unit": "tsp"},
            {"name": " Salt", "quantity": 2, "unit": "g"},
        ]));
        assert_eq!(
            validate_recipe(&raw),
            Err(ValidationError::DuplicateIngredient("Salt".into()))
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut raw = soup();
        raw.ingredients = Some(json!([
            {"name": "salt", "quantity": 1, "unit": "tsp"},
            {"name": "Salt", "quantity": 2, "unit": "g"},
        ]));
        assert_eq!(validate_recipe(&raw).unwrap().ingredients.len(), 2);
    }

    #[test]
    fn test_ingredient_name_rule() {
        assert_eq!(
            validate_ingredient_name(Some(&json!("  Pepper "))).unwrap(),
            "Pepper"
        );
        assert_eq!(validate_ingredient_name(Some(&json!("Šťava"))).unwrap(), "Šťava");
        assert_eq!(validate_ingredient_name(Some(&json!("7up"))).unwrap(), "7up");
        for bad in [json!("123"), json!("   "), json!(5), Value::Null] {
            assert_eq!(
                validate_ingredient_name(Some(&bad)),
                Err(ValidationError::InvalidIngredientName)
            );
        }
        assert_eq!(
            validate_ingredient_name(None),
            Err(ValidationError::InvalidIngredientName)
        );
    }

    #[test]
    fn test_rating_update() {
        for rating in 1..=5 {
            let update = validate_rating_update(&json!({ "rating": rating })).unwrap();
            assert_eq!(update.rating as i64, rating);
            assert_eq!(update.notes, None);
        }
        for bad in [json!(0), json!(6), json!(2.5), json!(null), json!(true)] {
            assert_eq!(
                validate_rating_update(&json!({ "rating": bad })),
                Err(ValidationError::InvalidRating)
            );
        }
        assert_eq!(
            validate_rating_update(&json!({})),
            Err(ValidationError::InvalidRating)
        );

        let update = validate_rating_update(&json!({"rating": "3", "notes": "tasty"})).unwrap();
        assert_eq!(update.rating, 3);
        assert_eq!(update.notes.as_deref(), Some("tasty"));
    }

    #[test]
    fn test_notes_rules() {
        assert_eq!(
            validate_rating_update(&json!({"rating": 3, "notes": "n".repeat(201)})),
            Err(ValidationError::InvalidNotes)
        );
        assert_eq!(
            validate_rating_update(&json!({"rating": 3, "notes": 12})),
            Err(ValidationError::InvalidNotes)
        );
        let cleared = validate_rating_update(&json!({"rating": 3, "notes": ""})).unwrap();
        assert_eq!(cleared.notes, None);
    }

    #[test]
    fn test_favorite_must_be_bool() {
        assert_eq!(validate_favorite(&json!({"favorite": true})), Ok(true));
        assert_eq!(validate_favorite(&json!({"favorite": false})), Ok(false));
        for bad in [json!("true"), json!(1), json!(null)] {
            assert_eq!(
                validate_favorite(&json!({ "favorite": bad })),
                Err(ValidationError::InvalidFavorite)
            );
        }
    }
}
