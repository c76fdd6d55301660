// Copyright 2023 Remi Bernotavicius

use crate::aggregate::{self, ShoppingListItem};
use crate::database;
use crate::database::models::{MealPlan, MealPlanId, RecipeHandle, RecipeId};
use crate::identity::AuthenticatedUser;
use crate::query;
use crate::validation;
use crate::{Error, Result};
use diesel::prelude::Connection as _;

pub struct MealPlanForm<'a> {
    pub recipe: RecipeId,
    /// `MON`..`SUN` or the full day name.
    pub day: &'a str,
    /// `BF`, `LU`, `DI` or the full slot name.
    pub slot: &'a str,
}

/// Puts a recipe in one of the user's meal slots. Slots may hold several recipes, so this never
/// replaces anything.
pub fn add(
    conn: &mut database::Connection,
    user: &AuthenticatedUser,
    form: MealPlanForm<'_>,
) -> Result<MealPlan> {
    let day = validation::day(form.day)?;
    let slot = validation::slot(form.slot)?;

    let (entry, recipe) = conn.transaction(|conn| {
        let recipe = query::find_recipe(conn, form.recipe)?
            .ok_or_else(|| Error::not_found("recipe", form.recipe))?;
        let entry = query::insert_meal_plan(conn, user.id(), recipe.id, day, slot)?;
        Ok::<_, Error>((entry, recipe))
    })?;

    log::info!(
        "The recipe has been added to the plan successfully: {} ({})",
        entry.describe(
            user.user(),
            &RecipeHandle {
                id: recipe.id,
                title: recipe.title
            }
        ),
        entry.slot
    );
    Ok(entry)
}

pub fn remove(
    conn: &mut database::Connection,
    user: &AuthenticatedUser,
    id: MealPlanId,
) -> Result<()> {
    if !query::delete_meal_plan(conn, user.id(), id)? {
        return Err(Error::not_found("meal plan entry", id));
    }
    log::info!("removed meal plan entry {id}");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMeal {
    pub entry: MealPlan,
    pub recipe: RecipeHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPlan {
    /// Monday first.
    pub meals: Vec<PlannedMeal>,
    pub shopping_list: Vec<ShoppingListItem>,
}

pub fn weekly_plan(conn: &mut database::Connection, user: &AuthenticatedUser) -> Result<WeeklyPlan> {
    conn.transaction(|conn| {
        let mut meals = query::meal_plans_for_user(conn, user.id())?;
        aggregate::sort_by_day(&mut meals);

        let ingredients =
            query::ingredients_for_recipes(conn, meals.iter().map(|(entry, _)| entry.recipe_id))?;
        let shopping_list =
            aggregate::shopping_list(meals.iter().map(|(entry, _)| entry), &ingredients);

        Ok(WeeklyPlan {
            meals: meals
                .into_iter()
                .map(|(entry, recipe)| PlannedMeal { entry, recipe })
                .collect(),
            shopping_list,
        })
    })
}

#[cfg(test)]
use crate::database::models::{DayOfWeek, MealSlot};
#[cfg(test)]
use crate::handlers::ingredient::test_ingredient;
#[cfg(test)]
use crate::handlers::recipe::{test_attach, test_recipe};
#[cfg(test)]
use crate::identity::test_user;

#[cfg(test)]
fn plan(
    conn: &mut database::Connection,
    user: &AuthenticatedUser,
    recipe: RecipeId,
    day: &str,
    slot: &str,
) -> MealPlan {
    add(conn, user, MealPlanForm { recipe, day, slot }).unwrap()
}

#[test]
fn weekly_plan_orders_by_weekday() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let salad = test_recipe(&mut conn, "Salad", "Toss");
    let alice = test_user(&mut conn, "alice");

    plan(&mut conn, &alice, soup.id, "WED", "LU");
    plan(&mut conn, &alice, salad.id, "Monday", "dinner");
    plan(&mut conn, &alice, soup.id, "SUN", "BF");

    let week = weekly_plan(&mut conn, &alice).unwrap();
    let days: Vec<_> = week
        .meals
        .iter()
        .map(|m| (m.entry.day, m.entry.slot, m.recipe.title.as_str()))
        .collect();
    assert_eq!(
        days,
        [
            (DayOfWeek::Monday, MealSlot::Dinner, "Salad"),
            (DayOfWeek::Wednesday, MealSlot::Lunch, "Soup"),
            (DayOfWeek::Sunday, MealSlot::Breakfast, "Soup"),
        ]
    );
}

#[test]
fn same_slot_accepts_several_recipes() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");

    let a = plan(&mut conn, &alice, soup.id, "FRI", "DI");
    let b = plan(&mut conn, &alice, soup.id, "FRI", "DI");
    assert_ne!(a.id, b.id);
    assert_eq!(weekly_plan(&mut conn, &alice).unwrap().meals.len(), 2);
}

#[test]
fn shopping_list_repeats_recipe_ingredients() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let salad = test_recipe(&mut conn, "Salad", "Toss");
    let toast = test_recipe(&mut conn, "Toast", "Grill");
    let water = test_ingredient(&mut conn, "Water");
    let leek = test_ingredient(&mut conn, "Leek");
    let lettuce = test_ingredient(&mut conn, "Lettuce");
    test_attach(&mut conn, &soup, &water, "1 l");
    test_attach(&mut conn, &soup, &leek, "2");
    test_attach(&mut conn, &salad, &lettuce, "1 head");

    let alice = test_user(&mut conn, "alice");
    let bob = test_user(&mut conn, "bob");
    plan(&mut conn, &alice, soup.id, "TUE", "LU");
    plan(&mut conn, &alice, salad.id, "MON", "LU");
    plan(&mut conn, &alice, soup.id, "THU", "DI");
    plan(&mut conn, &alice, toast.id, "SAT", "BF");
    plan(&mut conn, &bob, salad.id, "MON", "DI");

    let list: Vec<_> = weekly_plan(&mut conn, &alice)
        .unwrap()
        .shopping_list
        .iter()
        .map(|i| i.to_string())
        .collect();
    assert_eq!(
        list,
        ["1 head Lettuce", "1 l Water", "2 Leek", "1 l Water", "2 Leek"]
    );

    let list: Vec<_> = weekly_plan(&mut conn, &bob)
        .unwrap()
        .shopping_list
        .iter()
        .map(|i| i.to_string())
        .collect();
    assert_eq!(list, ["1 head Lettuce"]);
}

#[test]
fn plan_rejects_bad_input() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");

    let err = add(
        &mut conn,
        &alice,
        MealPlanForm {
            recipe: RecipeId::new(99),
            day: "MON",
            slot: "BF",
        },
    )
    .unwrap_err();
    assert!(err.is_not_found());

    for (day, slot) in [("Someday", "BF"), ("MON", "Elevenses")] {
        let err = add(
            &mut conn,
            &alice,
            MealPlanForm {
                recipe: soup.id,
                day,
                slot,
            },
        )
        .unwrap_err();
        assert!(err.is_validation());
    }
    assert!(weekly_plan(&mut conn, &alice).unwrap().meals.is_empty());
}

#[test]
fn remove_only_own_entries() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    let bob = test_user(&mut conn, "bob");
    let entry = plan(&mut conn, &alice, soup.id, "MON", "BF");

    assert!(remove(&mut conn, &bob, entry.id).unwrap_err().is_not_found());
    remove(&mut conn, &alice, entry.id).unwrap();
    assert!(weekly_plan(&mut conn, &alice).unwrap().meals.is_empty());
}

#[test]
fn describe_entry() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    let entry = plan(&mut conn, &alice, soup.id, "WED", "LU");
    let week = weekly_plan(&mut conn, &alice).unwrap();
    assert_eq!(
        entry.describe(alice.user(), &week.meals[0].recipe),
        "alice added Soup to Wednesday"
    );
}

#[test]
fn deleting_user_removes_their_plan() {
    use crate::database::schema::meal_plans;
    use diesel::QueryDsl as _;
    use diesel::RunQueryDsl as _;

    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    let bob = test_user(&mut conn, "bob");
    plan(&mut conn, &alice, soup.id, "MON", "BF");
    plan(&mut conn, &alice, soup.id, "SUN", "DI");
    plan(&mut conn, &bob, soup.id, "TUE", "LU");

    crate::identity::delete(&mut conn, "alice").unwrap();
    let remaining: i64 = meal_plans::table.count().get_result(&mut conn).unwrap();
    assert_eq!(remaining, 1);
    assert_eq!(weekly_plan(&mut conn, &bob).unwrap().meals.len(), 1);
}
