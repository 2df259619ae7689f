use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::catalog::is_palette_color;
use crate::database::models::{NewIngredient, NewTag};
use crate::database::Store;

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Load meal tags; defaults to breakfast, dinner and supper")]
    Tags {
        #[arg(help = "JSON file with [{name, color, slug}]")]
        file: Option<PathBuf>,
    },

    #[command(about = "Load the ingredient catalog")]
    Ingredients {
        #[arg(help = "JSON file with [{name, measurement_unit}]")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: FixtureCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FixtureCommands::Tags { file } => {
            let tags = match file {
                Some(path) => read_tags(&path)?,
                None => NewTag::defaults(),
            };
            let inserted = crate::cli::repository()?.insert_tags(&tags).await?;
            output_success(
                &output_format,
                &format!("Loaded {} of {} tags", inserted, tags.len()),
                Some(json!({ "inserted": inserted, "total": tags.len() })),
            )
        }
        FixtureCommands::Ingredients { file } => {
            let ingredients = read_ingredients(&file)?;
            let inserted = crate::cli::repository()?.insert_ingredients(&ingredients).await?;
            output_success(
                &output_format,
                &format!("Loaded {} of {} ingredients", inserted, ingredients.len()),
                Some(json!({ "inserted": inserted, "total": ingredients.len() })),
            )
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn read_tags(path: &Path) -> anyhow::Result<Vec<NewTag>> {
    let tags: Vec<NewTag> = read_json(path)?;
    if let Some(tag) = tags.iter().find(|t| !is_palette_color(&t.color)) {
        bail!("tag '{}' uses color {} outside the palette", tag.slug, tag.color);
    }
    Ok(tags)
}

pub fn read_ingredients(path: &Path) -> anyhow::Result<Vec<NewIngredient>> {
    let ingredients: Vec<NewIngredient> = read_json(path)?;
    if let Some(bad) = ingredients
        .iter()
        .find(|i| i.name.trim().is_empty() || i.measurement_unit.trim().is_empty())
    {
        bail!("ingredient {:?} has an empty name or unit", bad.name);
    }
    Ok(ingredients)
}
