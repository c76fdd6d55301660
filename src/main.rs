// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use database::models::{DayOfWeek, IngredientId, MealPlanId, RecipeId};
use handlers::{ingredient, meal_plan, rating, recipe};
use pictures::DirectoryPictureStore;
use std::path::PathBuf;

mod aggregate;
mod config;
mod database;
mod error;
mod handlers;
mod identity;
mod pictures;
mod query;
mod validation;

pub use error::{Error, Result};

#[derive(Parser, Debug)]
struct Args {
    /// SQLite database to use.
    #[arg(long, env = "RECIPE_BOOK_DATABASE", global = true)]
    database: Option<PathBuf>,

    /// Directory uploaded pictures are copied into.
    #[arg(long, env = "RECIPE_BOOK_MEDIA_ROOT", global = true)]
    media_root: Option<PathBuf>,

    /// Identity handed over by the identity provider, needed to rate and plan.
    #[arg(long, env = "RECIPE_BOOK_USER", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    AddUser {
        username: String,
    },
    DeleteUser {
        username: String,
    },
    AddIngredient {
        title: String,
        picture: PathBuf,
    },
    Ingredients,
    DeleteIngredient {
        id: i32,
    },
    AddRecipe {
        title: String,
        instruction: String,
        picture: PathBuf,
    },
    Recipes,
    Recipe {
        id: i32,
    },
    DeleteRecipe {
        id: i32,
    },
    Attach {
        recipe: i32,
        ingredient: i32,
        amount: String,
    },
    Search {
        query: Option<String>,
    },
    Rate {
        recipe: i32,
        rate: String,
        #[arg(long)]
        review: Option<String>,
    },
    Plan {
        recipe: i32,
        day: String,
        slot: String,
    },
    Unplan {
        id: i32,
    },
    Week,
}

fn run(
    conn: &mut database::Connection,
    store: &DirectoryPictureStore,
    user: Option<&str>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::AddUser { username } => {
            let user = identity::register(conn, &username)?;
            println!("{} {}", user.id, user.username);
        }
        Commands::DeleteUser { username } => identity::delete(conn, &username)?,
        Commands::AddIngredient { title, picture } => {
            let picture = store.upload(picture)?;
            let new = ingredient::add(
                conn,
                ingredient::IngredientForm {
                    title: &title,
                    picture,
                },
            )?;
            println!("{} {}", new.id, new.title);
        }
        Commands::Ingredients => {
            for i in ingredient::list(conn)? {
                println!("{} {} ({})", i.id, i.title, i.picture);
            }
        }
        Commands::DeleteIngredient { id } => ingredient::delete(conn, IngredientId::new(id))?,
        Commands::AddRecipe {
            title,
            instruction,
            picture,
        } => {
            let picture = store.upload(picture)?;
            let new = recipe::add(
                conn,
                recipe::RecipeForm {
                    title: &title,
                    instruction: &instruction,
                    picture,
                },
            )?;
            println!("{} {}", new.id, new.title);
        }
        Commands::Recipes => {
            for summary in recipe::list(conn)? {
                println!(
                    "{} {} [{}]",
                    summary.recipe.id, summary.recipe.title, summary.average_rating
                );
            }
        }
        Commands::Recipe { id } => {
            let detail = recipe::detail(conn, RecipeId::new(id))?;
            println!("{} [{}]", detail.recipe.title, detail.average_rating);
            println!("{}", detail.recipe.instruction);
            println!("picture: {}", store.path_for(&detail.recipe.picture).display());
            for (usage, ingredient) in &detail.ingredients {
                println!("  {}. {} {}", usage.order + 1, usage.amount, ingredient.title);
            }
            for rating in &detail.ratings {
                println!(
                    "  rated {} on {}{}",
                    rating.rate,
                    rating.date.format("%Y-%m-%d"),
                    rating
                        .review
                        .as_deref()
                        .map(|r| format!(": {r}"))
                        .unwrap_or_default()
                );
            }
        }
        Commands::DeleteRecipe { id } => recipe::delete(conn, RecipeId::new(id))?,
        Commands::Attach {
            recipe: recipe_id,
            ingredient: ingredient_id,
            amount,
        } => {
            let usage = recipe::add_ingredient(
                conn,
                recipe::RecipeIngredientForm {
                    recipe: RecipeId::new(recipe_id),
                    ingredient: IngredientId::new(ingredient_id),
                    amount: &amount,
                },
            )?;
            println!("{} order {}", usage.id, usage.order);
        }
        Commands::Search { query } => {
            for found in recipe::search(conn, query.as_deref())? {
                println!("{} {}", found.id, found.title);
            }
        }
        Commands::Rate {
            recipe: recipe_id,
            rate,
            review,
        } => {
            let user = identity::authenticate(conn, user)?;
            let rating = rating::rate(
                conn,
                &user,
                RecipeId::new(recipe_id),
                rating::RatingForm {
                    rate: &rate,
                    review: review.as_deref(),
                },
            )?;
            println!("{} {}", rating.id, rating.rate);
        }
        Commands::Plan {
            recipe: recipe_id,
            day,
            slot,
        } => {
            let user = identity::authenticate(conn, user)?;
            let entry = meal_plan::add(
                conn,
                &user,
                meal_plan::MealPlanForm {
                    recipe: RecipeId::new(recipe_id),
                    day: &day,
                    slot: &slot,
                },
            )?;
            println!("{} {} {}", entry.id, entry.day, entry.slot);
        }
        Commands::Unplan { id } => {
            let user = identity::authenticate(conn, user)?;
            meal_plan::remove(conn, &user, MealPlanId::new(id))?;
        }
        Commands::Week => {
            let user = identity::authenticate(conn, user)?;
            let week = meal_plan::weekly_plan(conn, &user)?;
            for day in DayOfWeek::iter() {
                let meals: Vec<_> = week.meals.iter().filter(|m| m.entry.day == day).collect();
                if meals.is_empty() {
                    continue;
                }
                println!("{day}");
                for meal in meals {
                    println!(
                        "  {} {:<9} {}",
                        meal.entry.id,
                        meal.entry.slot.to_string(),
                        meal.recipe.title
                    );
                }
            }
            if !week.shopping_list.is_empty() {
                println!();
                println!("Shopping list:");
                for item in &week.shopping_list {
                    println!("  {item}");
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args = Args::parse();
    let config = config::Config::resolve(args.database, args.media_root)?;
    let mut conn = database::establish_connection(&config.database_path)?;
    let store = DirectoryPictureStore::new(&config.media_root);
    run(&mut conn, &store, args.user.as_deref(), args.commands)
}
