use crate::food::models::{Nutrient, RecipeDetail};

pub const NOT_AVAILABLE: &str = "N/A";

pub fn prep_line(recipe: &RecipeDetail) -> String {
    format!(
        "Prep Time: {} minutes | Servings: {}",
        or_na(recipe.ready_in_minutes),
        or_na(recipe.servings)
    )
}

pub fn ingredients_text(recipe: &RecipeDetail) -> String {
    if recipe.ingredients.is_empty() {
        "No ingredients listed.".to_string()
    } else {
        recipe.ingredients.join(", ")
    }
}

pub fn instructions_text(recipe: &RecipeDetail) -> String {
    recipe
        .instructions
        .clone()
        .unwrap_or_else(|| "No instructions available.".to_string())
}

pub fn nutrient_line(nutrient: &Nutrient) -> String {
    let amount = nutrient
        .amount
        .map(|a| a.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    format!("{}: {} {}", nutrient.name, amount, nutrient.unit)
        .trim_end()
        .to_string()
}

/// Plain-text card for one recipe, with placeholders for whatever the API
/// left out.
pub fn recipe_card(recipe: &RecipeDetail) -> String {
    let mut card = String::new();

    card.push_str(&format!("{}\n", recipe.title));
    if let Some(image) = &recipe.image {
        card.push_str(&format!("Image: {}\n", image));
    }
    card.push_str(&format!("{}\n\n", prep_line(recipe)));

    card.push_str("Ingredients:\n");
    card.push_str(&format!("{}\n\n", ingredients_text(recipe)));

    card.push_str("Instructions:\n");
    card.push_str(&format!("{}\n\n", instructions_text(recipe)));

    match &recipe.nutrition {
        Some(nutrients) => {
            card.push_str("Nutritional Information:\n");
            for nutrient in nutrients {
                card.push_str(&format!("{}\n", nutrient_line(nutrient)));
            }
        }
        None => card.push_str("No nutritional information available.\n"),
    }

    card.push_str(&format!("\nShare: {}\n", recipe.share_link()));
    card
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
