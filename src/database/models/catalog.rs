use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Colors a tag may carry
pub const TAG_PALETTE: &[&str] = &[
    "#d6bbcb", "#5e00ff", "#81b0fd", "#c90076", "#6dc066", "#49b64e", "#7c12e1",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// Palette membership ignores hex digit case
pub fn is_palette_color(color: &str) -> bool {
    TAG_PALETTE.iter().any(|c| c.eq_ignore_ascii_case(color))
}

impl NewTag {
    fn new(name: &str, color: &str, slug: &str) -> Self {
        Self { name: name.to_string(), color: color.to_string(), slug: slug.to_string() }
    }

    /// Meal tags every fresh install starts with
    pub fn defaults() -> Vec<NewTag> {
        vec![
            NewTag::new("Breakfast", "#c90076", "breakfast"),
            NewTag::new("Dinner", "#49b64e", "dinner"),
            NewTag::new("Supper", "#7c12e1", "supper"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tags_use_the_palette() {
        for tag in NewTag::defaults() {
            assert!(is_palette_color(&tag.color), "{}", tag.color);
        }
        assert!(is_palette_color("#49B64E"));
        assert!(!is_palette_color("#000000"));
    }
}
