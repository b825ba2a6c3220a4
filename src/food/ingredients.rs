use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown diet '{0}'. Available diets: none, vegan, gluten free, dairy free, paleo, ketogenic, low carb")]
pub struct UnknownDiet(pub String);

/// Dietary filter accepted by the recipe search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Diet {
    #[default]
    None,
    Vegan,
    GlutenFree,
    DairyFree,
    Paleo,
    Ketogenic,
    LowCarb,
}

impl Diet {
    pub const ALL: [Diet; 7] = [
        Diet::None,
        Diet::Vegan,
        Diet::GlutenFree,
        Diet::DairyFree,
        Diet::Paleo,
        Diet::Ketogenic,
        Diet::LowCarb,
    ];

    /// Value sent as the `diet` query parameter. Empty means no filter.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Diet::None => "",
            Diet::Vegan => "vegan",
            Diet::GlutenFree => "gluten free",
            Diet::DairyFree => "dairy free",
            Diet::Paleo => "paleo",
            Diet::Ketogenic => "ketogenic",
            Diet::LowCarb => "low carb",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Diet::None => "none",
            other => other.as_query_value(),
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Diet {
    type Err = UnknownDiet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();

        match key.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "" | "none" => Ok(Diet::None),
            "vegan" => Ok(Diet::Vegan),
            "gluten free" => Ok(Diet::GlutenFree),
            "dairy free" => Ok(Diet::DairyFree),
            "paleo" => Ok(Diet::Paleo),
            "ketogenic" | "keto" => Ok(Diet::Ketogenic),
            "low carb" => Ok(Diet::LowCarb),
            _ => Err(UnknownDiet(s.to_string())),
        }
    }
}

impl TryFrom<String> for Diet {
    type Error = UnknownDiet;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Diet> for String {
    fn from(diet: Diet) -> Self {
        diet.as_query_value().to_string()
    }
}

/// Splits comma-separated ingredient text into trimmed, non-empty names,
/// keeping their original order.
pub fn normalize(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// One user submission: canonical ingredient names plus the diet filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientQuery {
    ingredients: Vec<String>,
    diet: Diet,
}

impl IngredientQuery {
    /// Returns `None` when the input holds no ingredient at all.
    pub fn new(raw: &str, diet: Diet) -> Option<Self> {
        Self::from_ingredients(normalize(raw), diet)
    }

    pub fn from_ingredients<I, S>(ingredients: I, diet: Diet) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ingredients: Vec<String> = ingredients
            .into_iter()
            .flat_map(|item| normalize(item.as_ref()))
            .collect();

        if ingredients.is_empty() {
            None
        } else {
            Some(Self { ingredients, diet })
        }
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn diet(&self) -> Diet {
        self.diet
    }

    /// The `ingredients` query parameter.
    pub fn joined(&self) -> String {
        self.ingredients.join(",")
    }
}
