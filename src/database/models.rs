// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use rust_decimal::Decimal;
use strum::{EnumIter, EnumString};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
        pub struct $name(i32);

        impl $name {
            #[allow(dead_code)]
            pub fn new(id: i32) -> Self {
                Self(id)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(IngredientId);
id_newtype!(RecipeId);
id_newtype!(RecipeIngredientId);
id_newtype!(RatingId);
id_newtype!(MealPlanId);

/// Reference to an image held by the picture store, e.g. `images/salt.png`.
#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, Clone)]
pub struct PictureRef(String);

impl PictureRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Display)]
#[diesel(table_name = crate::database::schema::users)]
#[display("{username}")]
pub struct User {
    pub id: UserId,
    pub username: String,
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Display)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[display("{title}")]
pub struct Ingredient {
    pub id: IngredientId,
    pub title: String,
    pub picture: PictureRef,
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Display)]
#[diesel(table_name = crate::database::schema::recipes)]
#[display("{title}")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub instruction: String,
    pub picture: PictureRef,
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Display)]
#[diesel(table_name = crate::database::schema::recipes)]
#[display("{title}")]
pub struct RecipeHandle {
    pub id: RecipeId,
    pub title: String,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq)]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(Ingredient))]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
pub struct RecipeIngredient {
    pub id: RecipeIngredientId,
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub amount: String,
    pub order: i32,
}

impl RecipeIngredient {
    pub fn describe(&self, ingredient: &Ingredient, recipe: &Recipe) -> String {
        format!("{} {} in {}", self.amount, ingredient.title, recipe.title)
    }
}

/// A rating stored in tenths, so `4.5` is kept as `45`.
#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct Rate(i32);

impl Rate {
    pub const MIN: Self = Self(10);
    pub const MAX: Self = Self(50);

    pub(crate) fn from_tenths(tenths: i32) -> Self {
        Self(tenths)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0.into(), 1)
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq)]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(User))]
#[diesel(table_name = crate::database::schema::ratings)]
pub struct Rating {
    pub id: RatingId,
    pub rate: Rate,
    pub user_id: UserId,
    pub recipe_id: RecipeId,
    pub date: chrono::NaiveDateTime,
    pub review: Option<String>,
}

impl Rating {
    pub fn describe(&self, user: &User, recipe: &Recipe) -> String {
        format!("{} rated {} to {}", user.username, self.rate, recipe.title)
    }
}

#[derive(
    Debug, Display, EnumIter, EnumString, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, DbEnum,
)]
#[strum(ascii_case_insensitive)]
pub enum DayOfWeek {
    #[db_rename = "MON"]
    #[strum(serialize = "MON", serialize = "Monday")]
    #[display("Monday")]
    Monday,
    #[db_rename = "TUE"]
    #[strum(serialize = "TUE", serialize = "Tuesday")]
    #[display("Tuesday")]
    Tuesday,
    #[db_rename = "WED"]
    #[strum(serialize = "WED", serialize = "Wednesday")]
    #[display("Wednesday")]
    Wednesday,
    #[db_rename = "THU"]
    #[strum(serialize = "THU", serialize = "Thursday")]
    #[display("Thursday")]
    Thursday,
    #[db_rename = "FRI"]
    #[strum(serialize = "FRI", serialize = "Friday")]
    #[display("Friday")]
    Friday,
    #[db_rename = "SAT"]
    #[strum(serialize = "SAT", serialize = "Saturday")]
    #[display("Saturday")]
    Saturday,
    #[db_rename = "SUN"]
    #[strum(serialize = "SUN", serialize = "Sunday")]
    #[display("Sunday")]
    Sunday,
}

impl DayOfWeek {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(
    Debug, Display, EnumIter, EnumString, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, DbEnum,
)]
#[strum(ascii_case_insensitive)]
pub enum MealSlot {
    #[db_rename = "BF"]
    #[strum(serialize = "BF", serialize = "Breakfast")]
    #[display("Breakfast")]
    Breakfast,
    #[db_rename = "LU"]
    #[strum(serialize = "LU", serialize = "Lunch")]
    #[display("Lunch")]
    Lunch,
    #[db_rename = "DI"]
    #[strum(serialize = "DI", serialize = "Dinner")]
    #[display("Dinner")]
    Dinner,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq)]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(User))]
#[diesel(table_name = crate::database::schema::meal_plans)]
pub struct MealPlan {
    pub id: MealPlanId,
    pub recipe_id: RecipeId,
    pub user_id: UserId,
    pub day: DayOfWeek,
    pub slot: MealSlot,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl MealPlan {
    pub fn describe(&self, user: &User, recipe: &RecipeHandle) -> String {
        format!("{} added {} to {}", user.username, recipe.title, self.day)
    }
}

#[test]
fn day_of_week_parses_codes_and_names() {
    use std::str::FromStr as _;

    assert_eq!(DayOfWeek::from_str("MON").unwrap(), DayOfWeek::Monday);
    assert_eq!(DayOfWeek::from_str("wed").unwrap(), DayOfWeek::Wednesday);
    assert_eq!(DayOfWeek::from_str("sunday").unwrap(), DayOfWeek::Sunday);
    assert!(DayOfWeek::from_str("Funday").is_err());

    assert_eq!(MealSlot::from_str("di").unwrap(), MealSlot::Dinner);
    assert_eq!(MealSlot::from_str("Breakfast").unwrap(), MealSlot::Breakfast);
    assert!(MealSlot::from_str("Brunch").is_err());
}

#[test]
fn day_of_week_orders_by_declaration() {
    let days: Vec<_> = DayOfWeek::iter().collect();
    let mut sorted = days.clone();
    sorted.sort();
    assert_eq!(days, sorted);
    assert!(DayOfWeek::Monday < DayOfWeek::Wednesday);
    assert!(DayOfWeek::Saturday < DayOfWeek::Sunday);
    assert_eq!(days.len(), 7);
    assert_eq!(days[0].to_string(), "Monday");
}

#[test]
fn rate_display() {
    assert_eq!(Rate::from_tenths(45).to_string(), "4.5");
    assert_eq!(Rate::MIN.to_string(), "1.0");
    assert_eq!(Rate::MAX.to_decimal(), Decimal::new(5, 0));
}
