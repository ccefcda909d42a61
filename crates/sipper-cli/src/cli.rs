use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sipper_types::Unit;

#[derive(Parser)]
#[command(
    name = "sipper",
    about = "Sipper: a catalog of drink ingredients and recipes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Catalog configuration file
    #[arg(long, global = true, default_value = "sipper.toml")]
    pub config: PathBuf,

    /// Database file, overriding the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the catalog store if it does not exist
    Init,
    /// Manage ingredients
    #[command(subcommand)]
    Ingredient(IngredientCommand),
    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),
}

#[derive(Subcommand)]
pub enum IngredientCommand {
    /// List ingredients in catalog order
    List,
    /// Show one ingredient
    Show { id: i64 },
    /// Add a new ingredient
    Add(IngredientArgs),
    /// Change fields of an existing ingredient
    Set {
        id: i64,
        #[command(flatten)]
        fields: IngredientArgs,
    },
    /// Delete an ingredient and its uses in recipes
    Rm { id: i64 },
}

/// Ingredient fields. Omitted fields keep their current value on `set`.
#[derive(Args)]
pub struct IngredientArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Container size quantity
    #[arg(long, requires = "unit")]
    pub size: Option<f64>,
    /// Container size unit (L, DL, CL, ML, OZ, TBSP, TSP)
    #[arg(long, requires = "size")]
    pub unit: Option<Unit>,
    /// Container price
    #[arg(long)]
    pub price: Option<f64>,
    /// Alcohol content as a fraction, e.g. 0.4
    #[arg(long)]
    pub alcohol: Option<f64>,
    #[arg(long)]
    pub store: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Subcommand)]
pub enum RecipeCommand {
    /// List recipes in catalog order
    List,
    /// Show one recipe with its ingredients
    Show { id: i64 },
    /// Create a recipe
    New {
        name: String,
        #[arg(short, long)]
        instructions: Option<String>,
    },
    /// Rename a recipe
    Rename { id: i64, name: String },
    /// Set the amount of an ingredient in a recipe
    Put {
        recipe: i64,
        ingredient: i64,
        quantity: f64,
        unit: Unit,
    },
    /// Remove an ingredient from a recipe
    Drop { recipe: i64, ingredient: i64 },
    /// Delete a recipe
    Rm { id: i64 },
    /// Show the price of a recipe
    Price { id: i64 },
}
