// Copyright 2023 Remi Bernotavicius

use crate::database::models::{
    DayOfWeek, Ingredient, IngredientId, MealPlan, MealPlanId, MealSlot, PictureRef, Rate, Rating,
    Recipe, RecipeHandle, RecipeId, RecipeIngredient, UserId,
};
use crate::database::{self, fold_case, unicode_lower};
use crate::Result;
use diesel::prelude::OptionalExtension as _;
use diesel::BelongingToDsl as _;
use diesel::BoolExpressionMethods as _;
use diesel::ExpressionMethods as _;
use diesel::GroupedBy as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::HashMap;

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub fn ingredient_title_taken(conn: &mut database::Connection, new_title: &str) -> Result<bool> {
    use database::schema::ingredients::dsl::*;
    use diesel::dsl::exists;

    Ok(
        diesel::select(exists(ingredients.filter(title_key.eq(fold_case(new_title)))))
            .get_result(conn)?,
    )
}

pub fn insert_ingredient(
    conn: &mut database::Connection,
    new_title: &str,
    new_picture: &PictureRef,
) -> Result<Ingredient> {
    use database::schema::ingredients::dsl::*;
    use diesel::insert_into;

    Ok(insert_into(ingredients)
        .values((
            title.eq(new_title),
            title_key.eq(fold_case(new_title)),
            picture.eq(new_picture),
        ))
        .returning(Ingredient::as_returning())
        .get_result(conn)?)
}

pub fn find_ingredient(
    conn: &mut database::Connection,
    find_id: IngredientId,
) -> Result<Option<Ingredient>> {
    use database::schema::ingredients::dsl::*;

    Ok(ingredients
        .select(Ingredient::as_select())
        .filter(id.eq(find_id))
        .get_result(conn)
        .optional()?)
}

pub fn all_ingredients(conn: &mut database::Connection) -> Result<Vec<Ingredient>> {
    use database::schema::ingredients::dsl::*;

    Ok(ingredients
        .select(Ingredient::as_select())
        .order(title.asc())
        .load(conn)?)
}

pub fn delete_ingredient(conn: &mut database::Connection, delete_id: IngredientId) -> Result<bool> {
    use database::schema::ingredients::dsl::*;
    use diesel::delete;

    Ok(delete(ingredients.filter(id.eq(delete_id))).execute(conn)? > 0)
}

pub fn insert_recipe(
    conn: &mut database::Connection,
    new_title: &str,
    new_instruction: &str,
    new_picture: &PictureRef,
) -> Result<Recipe> {
    use database::schema::recipes::dsl::*;
    use diesel::insert_into;

    Ok(insert_into(recipes)
        .values((
            title.eq(new_title),
            instruction.eq(new_instruction),
            picture.eq(new_picture),
        ))
        .returning(Recipe::as_returning())
        .get_result(conn)?)
}

pub fn find_recipe(conn: &mut database::Connection, find_id: RecipeId) -> Result<Option<Recipe>> {
    use database::schema::recipes::dsl::*;

    Ok(recipes
        .select(Recipe::as_select())
        .filter(id.eq(find_id))
        .get_result(conn)
        .optional()?)
}

pub fn all_recipes(conn: &mut database::Connection) -> Result<Vec<Recipe>> {
    use database::schema::recipes::dsl::*;

    Ok(recipes
        .select(Recipe::as_select())
        .order(id.asc())
        .load(conn)?)
}

pub fn delete_recipe(conn: &mut database::Connection, delete_id: RecipeId) -> Result<bool> {
    use database::schema::recipes::dsl::*;
    use diesel::delete;

    Ok(delete(recipes.filter(id.eq(delete_id))).execute(conn)? > 0)
}

/// The recipe's ingredient lines in display order.
pub fn recipe_ingredients(
    conn: &mut database::Connection,
    recipe: &Recipe,
) -> Result<Vec<(RecipeIngredient, Ingredient)>> {
    use database::schema::{ingredients, recipe_ingredients};

    Ok(RecipeIngredient::belonging_to(recipe)
        .inner_join(ingredients::table)
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .order(recipe_ingredients::order.asc())
        .load(conn)?)
}

pub fn ingredients_for_recipes(
    conn: &mut database::Connection,
    recipe_ids: impl IntoIterator<Item = RecipeId>,
) -> Result<HashMap<RecipeId, Vec<(RecipeIngredient, Ingredient)>>> {
    use database::schema::{ingredients, recipe_ingredients};

    let recipe_ids: Vec<RecipeId> = recipe_ids.into_iter().collect();
    let lines: Vec<(RecipeIngredient, Ingredient)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .order((
            recipe_ingredients::recipe_id.asc(),
            recipe_ingredients::order.asc(),
        ))
        .load(conn)?;

    let mut map: HashMap<RecipeId, Vec<_>> = HashMap::new();
    for (usage, ingredient) in lines {
        map.entry(usage.recipe_id)
            .or_default()
            .push((usage, ingredient));
    }
    Ok(map)
}

/// Whether any recipe at all already uses an ingredient with this title, ignoring case.
pub fn ingredient_attached_anywhere(
    conn: &mut database::Connection,
    ingredient_title: &str,
) -> Result<bool> {
    use database::schema::{ingredients, recipe_ingredients};
    use diesel::dsl::exists;

    Ok(diesel::select(exists(
        recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(ingredients::title_key.eq(fold_case(ingredient_title))),
    ))
    .get_result(conn)?)
}

/// One past the highest `order` used by `recipe`, or 0 for a recipe without ingredients.
pub fn next_ingredient_order(conn: &mut database::Connection, recipe: RecipeId) -> Result<i32> {
    use database::schema::recipe_ingredients::dsl::*;
    use diesel::dsl::max;

    let highest: Option<i32> = recipe_ingredients
        .filter(recipe_id.eq(recipe))
        .select(max(order))
        .get_result(conn)?;
    Ok(highest.map_or(0, |o| o + 1))
}

pub fn insert_recipe_ingredient(
    conn: &mut database::Connection,
    new_recipe_id: RecipeId,
    new_ingredient_id: IngredientId,
    new_amount: &str,
    new_order: i32,
) -> Result<RecipeIngredient> {
    use database::schema::recipe_ingredients::dsl::*;
    use diesel::insert_into;

    Ok(insert_into(recipe_ingredients)
        .values((
            recipe_id.eq(new_recipe_id),
            ingredient_id.eq(new_ingredient_id),
            amount.eq(new_amount),
            order.eq(new_order),
        ))
        .returning(RecipeIngredient::as_returning())
        .get_result(conn)?)
}

pub fn ratings_for_recipe(conn: &mut database::Connection, recipe: &Recipe) -> Result<Vec<Rating>> {
    Ok(Rating::belonging_to(recipe)
        .select(Rating::as_select())
        .load(conn)?)
}

/// Ratings for each of `recipes`, in the same order as `recipes`.
pub fn ratings_for_recipes(
    conn: &mut database::Connection,
    recipes: &[Recipe],
) -> Result<Vec<Vec<Rating>>> {
    Ok(Rating::belonging_to(recipes)
        .select(Rating::as_select())
        .load(conn)?
        .grouped_by(recipes))
}

pub fn user_ratings_for_recipe(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<Vec<Rating>> {
    use database::schema::ratings::dsl::*;

    Ok(ratings
        .select(Rating::as_select())
        .filter(user_id.eq(user))
        .filter(recipe_id.eq(recipe))
        .load(conn)?)
}

pub fn delete_user_ratings_for_recipe(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<usize> {
    use database::schema::ratings::dsl::*;
    use diesel::delete;

    Ok(delete(ratings.filter(user_id.eq(user).and(recipe_id.eq(recipe)))).execute(conn)?)
}

pub fn insert_rating(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
    new_rate: Rate,
    new_review: Option<&str>,
) -> Result<Rating> {
    use database::schema::ratings::dsl::*;
    use diesel::insert_into;

    Ok(insert_into(ratings)
        .values((
            rate.eq(new_rate),
            user_id.eq(user),
            recipe_id.eq(recipe),
            date.eq(now()),
            review.eq(new_review),
        ))
        .returning(Rating::as_returning())
        .get_result(conn)?)
}

/// Recipes whose title, instruction or any ingredient title contains `query`, ignoring case.
/// Each recipe appears once no matter how many of its fields match.
pub fn search_recipes(conn: &mut database::Connection, query: &str) -> Result<Vec<Recipe>> {
    use database::schema::{ingredients, recipe_ingredients, recipes};
    use diesel::expression_methods::EscapeExpressionMethods as _;
    use diesel::expression_methods::TextExpressionMethods as _;

    let pattern = format!("%{}%", escape_like(&fold_case(query)));
    let by_ingredient = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(ingredients::title_key.like(pattern.clone()).escape('\\'))
        .select(recipe_ingredients::recipe_id);

    Ok(recipes::table
        .filter(
            unicode_lower(recipes::title)
                .like(pattern.clone())
                .escape('\\')
                .or(unicode_lower(recipes::instruction)
                    .like(pattern)
                    .escape('\\'))
                .or(recipes::id.eq_any(by_ingredient)),
        )
        .select(Recipe::as_select())
        .order(recipes::id.asc())
        .load(conn)?)
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn insert_meal_plan(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
    new_day: DayOfWeek,
    new_slot: MealSlot,
) -> Result<MealPlan> {
    use database::schema::meal_plans::dsl::*;
    use diesel::insert_into;

    let timestamp = now();
    Ok(insert_into(meal_plans)
        .values((
            recipe_id.eq(recipe),
            user_id.eq(user),
            day.eq(new_day),
            slot.eq(new_slot),
            created_at.eq(timestamp),
            updated_at.eq(timestamp),
        ))
        .returning(MealPlan::as_returning())
        .get_result(conn)?)
}

/// The user's plan entries with their recipes, in insertion order.
pub fn meal_plans_for_user(
    conn: &mut database::Connection,
    user: UserId,
) -> Result<Vec<(MealPlan, RecipeHandle)>> {
    use database::schema::{meal_plans, recipes};

    Ok(meal_plans::table
        .inner_join(recipes::table)
        .filter(meal_plans::user_id.eq(user))
        .select((MealPlan::as_select(), RecipeHandle::as_select()))
        .order(meal_plans::id.asc())
        .load(conn)?)
}

pub fn delete_meal_plan(
    conn: &mut database::Connection,
    user: UserId,
    delete_id: MealPlanId,
) -> Result<bool> {
    use database::schema::meal_plans::dsl::*;
    use diesel::delete;

    Ok(delete(meal_plans.filter(id.eq(delete_id).and(user_id.eq(user)))).execute(conn)? > 0)
}

#[test]
fn escape_like_wildcards() {
    assert_eq!(escape_like("tomato"), "tomato");
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
}

#[test]
fn ingredients_for_recipes_groups_in_order() {
    let mut conn = database::test_connection();
    let picture = PictureRef::new("images/p.png");
    let soup = insert_recipe(&mut conn, "Soup", "Boil", &picture).unwrap();
    let salad = insert_recipe(&mut conn, "Salad", "Toss", &picture).unwrap();
    let water = insert_ingredient(&mut conn, "Water", &picture).unwrap();
    let leek = insert_ingredient(&mut conn, "Leek", &picture).unwrap();
    let lettuce = insert_ingredient(&mut conn, "Lettuce", &picture).unwrap();

    insert_recipe_ingredient(&mut conn, soup.id, leek.id, "2", 1).unwrap();
    insert_recipe_ingredient(&mut conn, soup.id, water.id, "1 l", 0).unwrap();
    insert_recipe_ingredient(&mut conn, salad.id, lettuce.id, "1 head", 0).unwrap();

    let map = ingredients_for_recipes(&mut conn, [soup.id, salad.id]).unwrap();
    let titles = |id: RecipeId| -> Vec<String> {
        map[&id].iter().map(|(_, i)| i.title.clone()).collect()
    };
    assert_eq!(titles(soup.id), ["Water", "Leek"]);
    assert_eq!(titles(salad.id), ["Lettuce"]);

    assert_eq!(next_ingredient_order(&mut conn, soup.id).unwrap(), 2);
    assert_eq!(
        next_ingredient_order(&mut conn, RecipeId::new(999)).unwrap(),
        0
    );
}

#[test]
fn ingredient_title_taken_ignores_case() {
    let mut conn = database::test_connection();
    let picture = PictureRef::new("images/p.png");
    insert_ingredient(&mut conn, "Salt", &picture).unwrap();
    assert!(ingredient_title_taken(&mut conn, "salt").unwrap());
    assert!(ingredient_title_taken(&mut conn, "SALT").unwrap());
    assert!(!ingredient_title_taken(&mut conn, "Pepper").unwrap());

    insert_ingredient(&mut conn, "Ñame", &picture).unwrap();
    assert!(ingredient_title_taken(&mut conn, "ñAME").unwrap());
    assert!(insert_ingredient(&mut conn, "ñame", &picture).is_err());
}
