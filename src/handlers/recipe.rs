// Copyright 2023 Remi Bernotavicius

use crate::aggregate;
use crate::database;
use crate::database::models::{
    Ingredient, IngredientId, PictureRef, Rating, Recipe, RecipeId, RecipeIngredient,
};
use crate::query;
use crate::validation;
use crate::{Error, Result};
use diesel::prelude::Connection as _;
use rust_decimal::Decimal;

pub struct RecipeForm<'a> {
    pub title: &'a str,
    pub instruction: &'a str,
    pub picture: PictureRef,
}

/// Creates a recipe with no ingredients. Ingredients are attached afterwards with
/// [`add_ingredient`].
pub fn add(conn: &mut database::Connection, form: RecipeForm<'_>) -> Result<Recipe> {
    let title = validation::required_text("title", form.title, validation::TITLE_MAX_LENGTH)?;
    let instruction = validation::required_text(
        "instruction",
        form.instruction,
        validation::INSTRUCTION_MAX_LENGTH,
    )?;
    validation::picture(&form.picture)?;

    let recipe = query::insert_recipe(conn, &title, &instruction, &form.picture)?;
    log::info!("The recipe has been added successfully: {recipe}");
    Ok(recipe)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSummary {
    pub recipe: Recipe,
    pub average_rating: Decimal,
}

pub fn list(conn: &mut database::Connection) -> Result<Vec<RecipeSummary>> {
    conn.transaction(|conn| {
        let recipes = query::all_recipes(conn)?;
        let ratings = query::ratings_for_recipes(conn, &recipes)?;
        Ok(recipes
            .into_iter()
            .zip(ratings)
            .map(|(recipe, ratings)| RecipeSummary {
                recipe,
                average_rating: aggregate::average_rating(ratings.iter().map(|r| r.rate)),
            })
            .collect())
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub average_rating: Decimal,
    pub ingredients: Vec<(RecipeIngredient, Ingredient)>,
    pub ratings: Vec<Rating>,
}

pub fn detail(conn: &mut database::Connection, id: RecipeId) -> Result<RecipeDetail> {
    conn.transaction(|conn| {
        let recipe = query::find_recipe(conn, id)?.ok_or_else(|| Error::not_found("recipe", id))?;
        let ingredients = query::recipe_ingredients(conn, &recipe)?;
        let ratings = query::ratings_for_recipe(conn, &recipe)?;
        Ok(RecipeDetail {
            average_rating: aggregate::average_rating(ratings.iter().map(|r| r.rate)),
            recipe,
            ingredients,
            ratings,
        })
    })
}

/// Deletes the recipe along with its ingredient lines, ratings and meal plan entries.
pub fn delete(conn: &mut database::Connection, id: RecipeId) -> Result<()> {
    if !query::delete_recipe(conn, id)? {
        return Err(Error::not_found("recipe", id));
    }
    log::info!("deleted recipe {id}");
    Ok(())
}

pub struct RecipeIngredientForm<'a> {
    pub recipe: RecipeId,
    pub ingredient: IngredientId,
    pub amount: &'a str,
}

/// Attaches an ingredient to a recipe, placing it after the recipe's existing ingredients.
pub fn add_ingredient(
    conn: &mut database::Connection,
    form: RecipeIngredientForm<'_>,
) -> Result<RecipeIngredient> {
    let amount = validation::required_text("amount", form.amount, validation::AMOUNT_MAX_LENGTH)?;

    let (usage, ingredient, recipe) = conn.immediate_transaction(|conn| {
        let recipe = query::find_recipe(conn, form.recipe)?
            .ok_or_else(|| Error::not_found("recipe", form.recipe))?;
        let ingredient = query::find_ingredient(conn, form.ingredient)?
            .ok_or_else(|| Error::not_found("ingredient", form.ingredient))?;

        if query::ingredient_attached_anywhere(conn, &ingredient.title)? {
            log::warn!("duplicate ingredient {ingredient} for {recipe}");
            return Err(Error::validation(
                "ingredient",
                "this ingredient already exists",
            ));
        }

        let order = query::next_ingredient_order(conn, recipe.id)?;
        let usage =
            query::insert_recipe_ingredient(conn, recipe.id, ingredient.id, &amount, order)?;
        Ok((usage, ingredient, recipe))
    })?;

    log::info!(
        "The ingredient and amount have been added successfully: {}",
        usage.describe(&ingredient, &recipe)
    );
    Ok(usage)
}

/// Recipes matching `text` by title, instruction or ingredient title. No query means no results.
pub fn search(conn: &mut database::Connection, text: Option<&str>) -> Result<Vec<Recipe>> {
    match text {
        None | Some("") => Ok(vec![]),
        Some(text) => {
            log::debug!("searching recipes for {text:?}");
            query::search_recipes(conn, text)
        }
    }
}

#[cfg(test)]
pub fn test_recipe(conn: &mut database::Connection, title: &str, instruction: &str) -> Recipe {
    add(
        conn,
        RecipeForm {
            title,
            instruction,
            picture: PictureRef::new("images/recipe.png"),
        },
    )
    .unwrap()
}

#[cfg(test)]
pub fn test_attach(
    conn: &mut database::Connection,
    recipe: &Recipe,
    ingredient: &Ingredient,
    amount: &str,
) -> RecipeIngredient {
    add_ingredient(
        conn,
        RecipeIngredientForm {
            recipe: recipe.id,
            ingredient: ingredient.id,
            amount,
        },
    )
    .unwrap()
}

#[cfg(test)]
use super::ingredient::test_ingredient;

#[test]
fn add_starts_without_ingredients() {
    let mut conn = database::test_connection();
    let recipe = test_recipe(&mut conn, "Pancakes", "Mix and fry");
    let d = detail(&mut conn, recipe.id).unwrap();
    assert_eq!(d.recipe, recipe);
    assert!(d.ingredients.is_empty());
    assert_eq!(d.average_rating.to_string(), "0.0");
}

#[test]
fn add_allows_duplicate_titles() {
    let mut conn = database::test_connection();
    let a = test_recipe(&mut conn, "Pancakes", "Mix and fry");
    let b = test_recipe(&mut conn, "Pancakes", "Mix and bake");
    assert_ne!(a.id, b.id);
    assert_eq!(list(&mut conn).unwrap().len(), 2);
}

#[test]
fn add_validates_fields() {
    let mut conn = database::test_connection();
    let err = add(
        &mut conn,
        RecipeForm {
            title: "Pancakes",
            instruction: &"x".repeat(265),
            picture: PictureRef::new("images/p.png"),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
    assert!(all_titles(&mut conn).is_empty());
}

#[cfg(test)]
fn all_titles(conn: &mut database::Connection) -> Vec<String> {
    list(conn)
        .unwrap()
        .into_iter()
        .map(|s| s.recipe.title)
        .collect()
}

#[test]
fn detail_missing_recipe() {
    let mut conn = database::test_connection();
    let err = detail(&mut conn, RecipeId::new(42)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "recipe 42 not found");
}

#[test]
fn attach_assigns_increasing_order() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let salad = test_recipe(&mut conn, "Salad", "Toss");
    let water = test_ingredient(&mut conn, "Water");
    let leek = test_ingredient(&mut conn, "Leek");
    let salt = test_ingredient(&mut conn, "Salt");
    let pepper = test_ingredient(&mut conn, "Pepper");

    assert_eq!(test_attach(&mut conn, &soup, &water, "1 l").order, 0);
    assert_eq!(test_attach(&mut conn, &salad, &pepper, "a pinch").order, 0);
    assert_eq!(test_attach(&mut conn, &soup, &leek, "2").order, 1);
    assert_eq!(test_attach(&mut conn, &soup, &salt, "1 tsp").order, 2);

    let d = detail(&mut conn, soup.id).unwrap();
    let lines: Vec<_> = d
        .ingredients
        .iter()
        .map(|(usage, ingredient)| (usage.order, usage.amount.as_str(), ingredient.title.as_str()))
        .collect();
    assert_eq!(
        lines,
        [(0, "1 l", "Water"), (1, "2", "Leek"), (2, "1 tsp", "Salt")]
    );
}

#[test]
fn attach_after_removal_does_not_reuse_order() {
    use crate::database::schema::recipe_ingredients::dsl::*;
    use diesel::ExpressionMethods as _;
    use diesel::QueryDsl as _;
    use diesel::RunQueryDsl as _;

    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let water = test_ingredient(&mut conn, "Water");
    let leek = test_ingredient(&mut conn, "Leek");
    let salt = test_ingredient(&mut conn, "Salt");

    let first = test_attach(&mut conn, &soup, &water, "1 l");
    test_attach(&mut conn, &soup, &leek, "2");
    diesel::delete(recipe_ingredients.filter(id.eq(first.id)))
        .execute(&mut conn)
        .unwrap();

    assert_eq!(test_attach(&mut conn, &soup, &salt, "1 tsp").order, 2);
}

#[test]
fn attach_rejects_ingredient_already_used_by_any_recipe() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let stew = test_recipe(&mut conn, "Stew", "Braise");
    let salt = test_ingredient(&mut conn, "Salt");

    test_attach(&mut conn, &soup, &salt, "1 tsp");
    for recipe in [soup.id, stew.id] {
        let err = add_ingredient(
            &mut conn,
            RecipeIngredientForm {
                recipe,
                ingredient: salt.id,
                amount: "2 tsp",
            },
        )
        .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "ingredient: this ingredient already exists");
    }
    assert!(detail(&mut conn, stew.id).unwrap().ingredients.is_empty());

    // Once nothing uses it any more it can be attached again.
    delete(&mut conn, soup.id).unwrap();
    assert_eq!(test_attach(&mut conn, &stew, &salt, "a pinch").order, 0);
}

#[test]
fn attach_to_missing_recipe_or_ingredient() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let salt = test_ingredient(&mut conn, "Salt");

    let err = add_ingredient(
        &mut conn,
        RecipeIngredientForm {
            recipe: RecipeId::new(99),
            ingredient: salt.id,
            amount: "1 tsp",
        },
    )
    .unwrap_err();
    assert!(err.is_not_found());

    let err = add_ingredient(
        &mut conn,
        RecipeIngredientForm {
            recipe: soup.id,
            ingredient: IngredientId::new(99),
            amount: "1 tsp",
        },
    )
    .unwrap_err();
    assert!(err.is_not_found());

    let err = add_ingredient(
        &mut conn,
        RecipeIngredientForm {
            recipe: soup.id,
            ingredient: salt.id,
            amount: " ",
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn search_empty_query_returns_nothing() {
    let mut conn = database::test_connection();
    test_recipe(&mut conn, "Tomato soup", "Blend");
    assert!(search(&mut conn, Some("")).unwrap().is_empty());
    assert!(search(&mut conn, None).unwrap().is_empty());
}

#[test]
fn search_matches_title_instruction_and_ingredients_once() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Tomato Soup", "Blend the TOMATOES");
    let salad = test_recipe(&mut conn, "Salad", "Add chopped tomato");
    let pasta = test_recipe(&mut conn, "Pasta", "Boil");
    let toast = test_recipe(&mut conn, "Toast", "Grill");

    let tomatoes = test_ingredient(&mut conn, "Cherry tomatoes");
    let passata = test_ingredient(&mut conn, "Tomato passata");
    let roma = test_ingredient(&mut conn, "Roma TOMATO");
    let paste = test_ingredient(&mut conn, "Tomato paste");
    let bread = test_ingredient(&mut conn, "Bread");
    test_attach(&mut conn, &soup, &tomatoes, "500 g");
    test_attach(&mut conn, &soup, &passata, "200 ml");
    test_attach(&mut conn, &pasta, &roma, "250 g");
    test_attach(&mut conn, &pasta, &paste, "100 ml");
    test_attach(&mut conn, &toast, &bread, "2 slices");

    let found: Vec<_> = search(&mut conn, Some("tomato"))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(found, [soup.id, salad.id, pasta.id]);
}

#[test]
fn search_treats_wildcards_literally() {
    let mut conn = database::test_connection();
    let sale = test_recipe(&mut conn, "50% off cake", "Bake");
    test_recipe(&mut conn, "500 cookies", "Bake");

    let found: Vec<_> = search(&mut conn, Some("50%"))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(found, [sale.id]);
}

#[test]
fn search_folds_case_beyond_ascii() {
    let mut conn = database::test_connection();
    let eclair = test_recipe(&mut conn, "ÉCLAIR au chocolat", "Pipe the choux");
    let pie = test_recipe(&mut conn, "Pie", "Bake");
    let nata = test_ingredient(&mut conn, "CRÈME fraîche");
    test_attach(&mut conn, &pie, &nata, "200 ml");

    let found: Vec<_> = search(&mut conn, Some("éclair"))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(found, [eclair.id]);

    let found: Vec<_> = search(&mut conn, Some("Crème"))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(found, [pie.id]);
}

#[test]
fn delete_cascades() {
    use crate::handlers::{meal_plan, rating};
    use crate::identity::test_user;

    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let salt = test_ingredient(&mut conn, "Salt");
    test_attach(&mut conn, &soup, &salt, "1 tsp");
    let user = test_user(&mut conn, "alice");
    rating::rate(
        &mut conn,
        &user,
        soup.id,
        rating::RatingForm {
            rate: "4",
            review: None,
        },
    )
    .unwrap();
    meal_plan::add(
        &mut conn,
        &user,
        meal_plan::MealPlanForm {
            recipe: soup.id,
            day: "MON",
            slot: "DI",
        },
    )
    .unwrap();

    delete(&mut conn, soup.id).unwrap();
    assert!(detail(&mut conn, soup.id).unwrap_err().is_not_found());
    assert!(query::ingredients_for_recipes(&mut conn, [soup.id])
        .unwrap()
        .is_empty());
    assert!(query::user_ratings_for_recipe(&mut conn, user.id(), soup.id)
        .unwrap()
        .is_empty());
    assert!(meal_plan::weekly_plan(&mut conn, &user)
        .unwrap()
        .meals
        .is_empty());

    // The ingredient itself survives.
    assert_eq!(super::ingredient::list(&mut conn).unwrap(), vec![salt]);
    assert!(delete(&mut conn, soup.id).unwrap_err().is_not_found());
}
