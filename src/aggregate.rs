// Copyright 2023 Remi Bernotavicius

use crate::database::models::{Ingredient, MealPlan, Rate, RecipeId, RecipeIngredient};
use derive_more::Display;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Mean of `rates` rounded half-up to one decimal place. No ratings gives `0.0`.
pub fn average_rating(rates: impl IntoIterator<Item = Rate>) -> Decimal {
    let (sum, count) = rates
        .into_iter()
        .fold((Decimal::ZERO, 0u32), |(sum, count), rate| {
            (sum + rate.to_decimal(), count + 1)
        });

    let mut average = if count == 0 {
        Decimal::ZERO
    } else {
        (sum / Decimal::from(count)).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };
    average.rescale(1);
    average
}

/// Stable sort by day, Monday first. Entries on the same day keep their relative order.
pub fn sort_by_day<T>(entries: &mut [(MealPlan, T)]) {
    entries.sort_by_key(|(entry, _)| entry.day);
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{amount} {ingredient}")]
pub struct ShoppingListItem {
    pub amount: String,
    pub ingredient: String,
}

/// Every planned meal contributes all of its recipe's ingredient lines, in recipe order. Nothing is
/// merged, so a recipe planned twice shows up twice.
pub fn shopping_list<'a>(
    plan: impl IntoIterator<Item = &'a MealPlan>,
    ingredients_by_recipe: &HashMap<RecipeId, Vec<(RecipeIngredient, Ingredient)>>,
) -> Vec<ShoppingListItem> {
    plan.into_iter()
        .flat_map(|entry| {
            ingredients_by_recipe
                .get(&entry.recipe_id)
                .into_iter()
                .flatten()
        })
        .map(|(usage, ingredient)| ShoppingListItem {
            amount: usage.amount.clone(),
            ingredient: ingredient.title.clone(),
        })
        .collect()
}

#[cfg(test)]
fn rates(tenths: &[i32]) -> Vec<Rate> {
    tenths.iter().copied().map(Rate::from_tenths).collect()
}

#[test]
fn average_rating_empty_is_zero() {
    let average = average_rating(vec![]);
    assert_eq!(average, Decimal::ZERO);
    assert_eq!(average.to_string(), "0.0");
}

#[test]
fn average_rating_single() {
    assert_eq!(average_rating(rates(&[35])).to_string(), "3.5");
    assert_eq!(average_rating(rates(&[50])).to_string(), "5.0");
}

#[test]
fn average_rating_multiple() {
    // 4.0 + 5.0 + 5.0 = 14.0, / 3 = 4.666..
    assert_eq!(average_rating(rates(&[40, 50, 50])).to_string(), "4.7");
    // 1.0 + 2.0 + 2.0 = 5.0, / 3 = 1.666..
    assert_eq!(average_rating(rates(&[10, 20, 20])).to_string(), "1.7");
    // 4.0 + 5.0 = 9.0, / 2 = 4.5
    assert_eq!(average_rating(rates(&[40, 50])).to_string(), "4.5");
}

#[test]
fn average_rating_rounds_midpoint_up() {
    // 4.5 + 4.0 = 8.5, / 2 = 4.25
    assert_eq!(average_rating(rates(&[45, 40])).to_string(), "4.3");
    // 1.0 + 1.1 + 1.1 + 1.1 = 4.3, / 4 = 1.075
    assert_eq!(average_rating(rates(&[10, 11, 11, 11])).to_string(), "1.1");
}

#[cfg(test)]
fn meal(id: i32, recipe: i32, day: crate::database::models::DayOfWeek) -> MealPlan {
    use crate::database::models::{MealPlanId, MealSlot, UserId};

    let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    MealPlan {
        id: MealPlanId::new(id),
        recipe_id: RecipeId::new(recipe),
        user_id: UserId::new(1),
        day,
        slot: MealSlot::Dinner,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn sort_by_day_is_stable_and_uses_week_order() {
    use crate::database::models::DayOfWeek::*;

    let mut entries = vec![
        (meal(1, 1, Wednesday), "a"),
        (meal(2, 1, Monday), "b"),
        (meal(3, 1, Sunday), "c"),
        (meal(4, 1, Monday), "d"),
        (meal(5, 1, Friday), "e"),
    ];
    sort_by_day(&mut entries);
    let order: Vec<_> = entries.iter().map(|(_, tag)| *tag).collect();
    assert_eq!(order, ["b", "d", "a", "e", "c"]);
}

#[test]
fn shopping_list_repeats_recipes() {
    use crate::database::models::{IngredientId, PictureRef, RecipeIngredientId};
    use crate::database::models::DayOfWeek::*;
    use maplit::hashmap;

    let line = |id: i32, recipe: i32, amount: &str, title: &str, order: i32| {
        (
            RecipeIngredient {
                id: RecipeIngredientId::new(id),
                recipe_id: RecipeId::new(recipe),
                ingredient_id: IngredientId::new(id),
                amount: amount.into(),
                order,
            },
            Ingredient {
                id: IngredientId::new(id),
                title: title.into(),
                picture: PictureRef::new("images/x.png"),
            },
        )
    };
    let ingredients = hashmap! {
        RecipeId::new(1) => vec![line(1, 1, "2 cups", "rice", 0), line(2, 1, "1 tsp", "salt", 1)],
        RecipeId::new(2) => vec![line(3, 2, "3", "eggs", 0)],
    };

    let plan = vec![meal(1, 1, Monday), meal(2, 2, Tuesday), meal(3, 1, Friday), meal(4, 3, Sunday)];
    let list: Vec<_> = shopping_list(&plan, &ingredients)
        .iter()
        .map(|i| i.to_string())
        .collect();
    assert_eq!(
        list,
        ["2 cups rice", "1 tsp salt", "3 eggs", "2 cups rice", "1 tsp salt"]
    );
}
