use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use serde::Serialize;
use sipper_cache::Catalog;
use sipper_store::{CatalogConfig, NEW_INGREDIENT_NAME};
use sipper_types::{round_currency, Amount, EntityId, Ingredient, Listed, Recipe, Unit};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Init => cmd_init(config),
        Command::Ingredient(command) => {
            let catalog = open(config)?;
            cmd_ingredient(&catalog, command, format)
        }
        Command::Recipe(command) => {
            let catalog = open(config)?;
            cmd_recipe(&catalog, command, format)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CatalogConfig> {
    let mut config = if cli.config.exists() {
        CatalogConfig::load(&cli.config)
            .with_context(|| format!("reading {}", cli.config.display()))?
    } else {
        CatalogConfig::default()
    };
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    tracing::debug!(database = %config.database.display(), "using catalog");
    Ok(config)
}

fn open(config: CatalogConfig) -> anyhow::Result<Catalog> {
    let path = config.database.display().to_string();
    Catalog::open(config).with_context(|| format!("opening catalog at {path}"))
}

fn cmd_init(config: CatalogConfig) -> anyhow::Result<()> {
    let path = config.database.display().to_string();
    let catalog = open(config)?;
    println!("{} Catalog ready at {}", "✓".green().bold(), path.bold());
    println!(
        "  {} ingredients, {} recipes",
        catalog.ingredients().len(),
        catalog.recipes().len()
    );
    Ok(())
}

// ---- Ingredients ----

fn cmd_ingredient(catalog: &Catalog, command: IngredientCommand, format: OutputFormat) -> anyhow::Result<()> {
    let cache = catalog.ingredients();
    match command {
        IngredientCommand::List => {
            let all = cache.snapshot();
            if format == OutputFormat::Json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No ingredients.");
            }
            for ingredient in &all {
                println!(
                    "{:>5}  {}  {}",
                    id_label(ingredient).yellow(),
                    ingredient.name.bold(),
                    format!("{} / {:.2}", ingredient.container_size, ingredient.container_price).dimmed()
                );
            }
            Ok(())
        }
        IngredientCommand::Show { id } => {
            let ingredient = ingredient_by_id(catalog, id)?;
            if format == OutputFormat::Json {
                return print_json(&ingredient);
            }
            print_ingredient(&ingredient);
            Ok(())
        }
        IngredientCommand::Add(fields) => {
            let ingredient = apply_fields(Ingredient::new(NEW_INGREDIENT_NAME), fields);
            let id = cache.save(&ingredient)?;
            report_saved(catalog, "ingredient", id, format)
        }
        IngredientCommand::Set { id, fields } => {
            let ingredient = apply_fields(ingredient_by_id(catalog, id)?, fields);
            let id = cache.save(&ingredient)?;
            report_saved(catalog, "ingredient", id, format)
        }
        IngredientCommand::Rm { id } => {
            let ingredient = ingredient_by_id(catalog, id)?;
            cache.remove(&ingredient)?;
            println!("{} Removed ingredient {}", "✓".green(), ingredient.name.yellow());
            Ok(())
        }
    }
}

fn apply_fields(mut ingredient: Ingredient, fields: IngredientArgs) -> Ingredient {
    if let Some(name) = fields.name {
        ingredient.name = name;
    }
    if let (Some(size), Some(unit)) = (fields.size, fields.unit) {
        ingredient.container_size = Amount::new(size, unit);
    }
    if let Some(price) = fields.price {
        ingredient.container_price = price;
    }
    if let Some(alcohol) = fields.alcohol {
        ingredient.alcohol_content = alcohol;
    }
    if let Some(store) = fields.store {
        ingredient.store = store;
    }
    if let Some(comment) = fields.comment {
        ingredient.comment = comment;
    }
    ingredient
}

fn print_ingredient(ingredient: &Ingredient) {
    println!("{} {}", id_label(ingredient).yellow().bold(), ingredient.name.bold());
    println!("  Container: {} for {:.2}", ingredient.container_size, ingredient.container_price);
    println!("  Per CL:    {:.2}", round_currency(ingredient.unit_price(Unit::CL)));
    println!("  Alcohol:   {:.1}%", ingredient.alcohol_content * 100.0);
    if !ingredient.store.is_empty() {
        println!("  Store:     {}", ingredient.store);
    }
    if !ingredient.comment.is_empty() {
        println!("  Comment:   {}", ingredient.comment.dimmed());
    }
}

// ---- Recipes ----

fn cmd_recipe(catalog: &Catalog, command: RecipeCommand, format: OutputFormat) -> anyhow::Result<()> {
    let cache = catalog.recipes();
    match command {
        RecipeCommand::List => {
            let all = cache.snapshot();
            if format == OutputFormat::Json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No recipes.");
            }
            for recipe in &all {
                println!(
                    "{:>5}  {}  {}",
                    id_label(recipe).yellow(),
                    recipe.name.bold(),
                    format!("{} ingredients", recipe.ingredients.len()).dimmed()
                );
            }
            Ok(())
        }
        RecipeCommand::Show { id } => {
            let recipe = recipe_by_id(catalog, id)?;
            if format == OutputFormat::Json {
                return print_json(&recipe);
            }
            print_recipe(&recipe);
            Ok(())
        }
        RecipeCommand::New { name, instructions } => {
            let recipe = Recipe::new(name).with_instructions(instructions.unwrap_or_default());
            let id = cache.save(&recipe)?;
            report_saved(catalog, "recipe", id, format)
        }
        RecipeCommand::Rename { id, name } => {
            let mut recipe = recipe_by_id(catalog, id)?;
            recipe.name = name;
            let id = cache.save(&recipe)?;
            report_saved(catalog, "recipe", id, format)
        }
        RecipeCommand::Put { recipe, ingredient, quantity, unit } => {
            let mut target = recipe_by_id(catalog, recipe)?;
            let ingredient = ingredient_by_id(catalog, ingredient)?;
            target.ingredients.insert(ingredient, Amount::new(quantity, unit));
            let id = cache.save(&target)?;
            report_saved(catalog, "recipe", id, format)
        }
        RecipeCommand::Drop { recipe, ingredient } => {
            let mut target = recipe_by_id(catalog, recipe)?;
            if target.ingredients.remove(EntityId::new(ingredient)).is_none() {
                bail!("recipe {} does not use ingredient {}", target.name, EntityId::new(ingredient));
            }
            let id = cache.save(&target)?;
            report_saved(catalog, "recipe", id, format)
        }
        RecipeCommand::Rm { id } => {
            let recipe = recipe_by_id(catalog, id)?;
            cache.remove(&recipe)?;
            println!("{} Removed recipe {}", "✓".green(), recipe.name.yellow());
            Ok(())
        }
        RecipeCommand::Price { id } => {
            let recipe = recipe_by_id(catalog, id)?;
            let price = round_currency(recipe.price());
            if format == OutputFormat::Json {
                return print_json(&PriceReport {
                    id: recipe.id(),
                    name: &recipe.name,
                    price,
                });
            }
            println!("{} {:.2}", recipe.name.bold(), price);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct PriceReport<'a> {
    id: Option<EntityId>,
    name: &'a str,
    price: f64,
}

fn print_recipe(recipe: &Recipe) {
    println!("{} {}", id_label(recipe).yellow().bold(), recipe.name.bold());
    for line in &recipe.ingredients {
        println!(
            "  {:>10}  {}  {}",
            line.amount.to_string(),
            line.ingredient.name,
            format!("{:.2}", round_currency(line.price())).dimmed()
        );
    }
    println!("  Total: {} for {:.2}", recipe.ingredients.total_volume(), round_currency(recipe.price()));
    if !recipe.instructions.is_empty() {
        println!("\n{}", recipe.instructions);
    }
}

// ---- Helpers ----

fn ingredient_by_id(catalog: &Catalog, id: i64) -> anyhow::Result<Ingredient> {
    catalog
        .ingredients()
        .find_by_id(EntityId::new(id))
        .ok_or_else(|| anyhow!("no ingredient with id {id}"))
}

fn recipe_by_id(catalog: &Catalog, id: i64) -> anyhow::Result<Recipe> {
    catalog
        .recipes()
        .find_by_id(EntityId::new(id))
        .ok_or_else(|| anyhow!("no recipe with id {id}"))
}

fn id_label(entity: &impl Listed) -> String {
    entity.id().map_or_else(|| "new".to_string(), |id| id.to_string())
}

fn report_saved(catalog: &Catalog, kind: &str, id: EntityId, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return match kind {
            "recipe" => print_json(&recipe_by_id(catalog, id.get())?),
            _ => print_json(&ingredient_by_id(catalog, id.get())?),
        };
    }
    println!("{} Saved {} {}", "✓".green().bold(), kind, id.to_string().yellow());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run(dir: &tempfile::TempDir, args: &[&str]) -> anyhow::Result<()> {
        let db = dir.path().join("cli.db");
        let mut argv = vec!["sipper", "--db", db.to_str().unwrap(), "--config", "absent.toml"];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv).unwrap())
    }

    fn catalog(dir: &tempfile::TempDir) -> Catalog {
        Catalog::open(CatalogConfig::at(dir.path().join("cli.db"))).unwrap()
    }

    #[test]
    fn apply_fields_keeps_omitted_values() {
        let gin = Ingredient::new("Gin").with_store("Corner shop").with_alcohol_content(0.4);
        let fields = IngredientArgs {
            name: None,
            size: Some(70.0),
            unit: Some(Unit::CL),
            price: Some(25.0),
            alcohol: None,
            store: None,
            comment: Some("dry".into()),
        };
        let updated = apply_fields(gin, fields);
        assert_eq!(updated.name, "Gin");
        assert_eq!(updated.store, "Corner shop");
        assert_eq!(updated.alcohol_content, 0.4);
        assert_eq!(updated.container_size, Amount::new(70.0, Unit::CL));
        assert_eq!(updated.comment, "dry");
    }

    #[test]
    fn ingredient_and_recipe_flow() {
        let dir = tempfile::tempdir().unwrap();
        run(&dir, &["init"]).unwrap();
        run(&dir, &["ingredient", "add", "--name", "Gin", "--size", "700", "--unit", "ml", "--price", "25"]).unwrap();
        run(&dir, &["ingredient", "add", "--name", "Tonic", "--size", "20", "--unit", "cl", "--price", "1.5"]).unwrap();
        run(&dir, &["recipe", "new", "Gin & Tonic"]).unwrap();
        run(&dir, &["recipe", "put", "1", "1", "5", "cl"]).unwrap();
        run(&dir, &["recipe", "put", "1", "2", "15", "cl"]).unwrap();
        run(&dir, &["recipe", "drop", "1", "2"]).unwrap();

        let catalog = catalog(&dir);
        let recipe = catalog.recipes().find_by_id(EntityId::new(1)).unwrap();
        assert_eq!(recipe.ingredients.len(), 1);
        assert!(recipe.ingredients.contains(EntityId::new(1)));
    }

    #[test]
    fn missing_ids_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir, &["ingredient", "show", "9"]).is_err());
        assert!(run(&dir, &["recipe", "price", "9"]).is_err());
        assert!(run(&dir, &["recipe", "drop", "9", "1"]).is_err());
    }

    #[test]
    fn rm_ingredient_updates_recipes() {
        let dir = tempfile::tempdir().unwrap();
        run(&dir, &["ingredient", "add", "--name", "Gin"]).unwrap();
        run(&dir, &["recipe", "new", "Gin shot"]).unwrap();
        run(&dir, &["recipe", "put", "1", "1", "4", "cl"]).unwrap();
        run(&dir, &["ingredient", "rm", "1"]).unwrap();

        let catalog = catalog(&dir);
        assert!(catalog.ingredients().is_empty());
        let recipe = catalog.recipes().find_by_id(EntityId::new(1)).unwrap();
        assert!(recipe.ingredients.is_empty());
    }
}
