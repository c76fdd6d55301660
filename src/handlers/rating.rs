// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{Rating, RecipeId};
use crate::identity::AuthenticatedUser;
use crate::query;
use crate::validation;
use crate::{Error, Result};

pub struct RatingForm<'a> {
    /// Between 1 and 5, e.g. `3.5`.
    pub rate: &'a str,
    pub review: Option<&'a str>,
}

/// Records `user`'s rating of a recipe, replacing any rating they gave it before.
pub fn rate(
    conn: &mut database::Connection,
    user: &AuthenticatedUser,
    recipe_id: RecipeId,
    form: RatingForm<'_>,
) -> Result<Rating> {
    let new_rate = validation::parse_rate(form.rate)?;
    let review =
        validation::optional_text("review", form.review, validation::REVIEW_MAX_LENGTH)?;

    let (rating, recipe) = conn.immediate_transaction(|conn| {
        let recipe = query::find_recipe(conn, recipe_id)?
            .ok_or_else(|| Error::not_found("recipe", recipe_id))?;
        let previous = query::user_ratings_for_recipe(conn, user.id(), recipe.id)?;
        if !previous.is_empty() {
            log::debug!("replacing {} earlier rating(s) by {}", previous.len(), user.user());
            query::delete_user_ratings_for_recipe(conn, user.id(), recipe.id)?;
        }
        let rating =
            query::insert_rating(conn, user.id(), recipe.id, new_rate, review.as_deref())?;
        Ok::<_, Error>((rating, recipe))
    })?;

    log::info!(
        "You have rated the recipe successfully: {}",
        rating.describe(user.user(), &recipe)
    );
    Ok(rating)
}

#[cfg(test)]
use crate::handlers::recipe::{detail, test_recipe};
#[cfg(test)]
use crate::identity::test_user;

#[cfg(test)]
fn rate_str(
    conn: &mut database::Connection,
    user: &AuthenticatedUser,
    recipe_id: RecipeId,
    value: &str,
) -> Result<Rating> {
    rate(
        conn,
        user,
        recipe_id,
        RatingForm {
            rate: value,
            review: None,
        },
    )
}

#[test]
fn average_reflects_ratings() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    let bob = test_user(&mut conn, "bob");
    let carol = test_user(&mut conn, "carol");

    assert_eq!(detail(&mut conn, soup.id).unwrap().average_rating.to_string(), "0.0");

    rate_str(&mut conn, &alice, soup.id, "4").unwrap();
    assert_eq!(detail(&mut conn, soup.id).unwrap().average_rating.to_string(), "4.0");

    rate_str(&mut conn, &bob, soup.id, "5").unwrap();
    rate_str(&mut conn, &carol, soup.id, "5").unwrap();
    assert_eq!(detail(&mut conn, soup.id).unwrap().average_rating.to_string(), "4.7");
}

#[test]
fn second_rating_replaces_first() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    let bob = test_user(&mut conn, "bob");

    let first = rate(
        &mut conn,
        &alice,
        soup.id,
        RatingForm {
            rate: "2.0",
            review: Some("too salty"),
        },
    )
    .unwrap();
    rate_str(&mut conn, &bob, soup.id, "3").unwrap();
    let second = rate_str(&mut conn, &alice, soup.id, "4.5").unwrap();
    assert_ne!(first.id, second.id);

    let ratings = query::user_ratings_for_recipe(&mut conn, alice.id(), soup.id).unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].rate.to_string(), "4.5");
    assert_eq!(ratings[0].review, None);

    // (4.5 + 3.0) / 2
    let d = detail(&mut conn, soup.id).unwrap();
    assert_eq!(d.ratings.len(), 2);
    assert_eq!(d.average_rating.to_string(), "3.8");
}

#[test]
fn rating_missing_recipe() {
    let mut conn = database::test_connection();
    let alice = test_user(&mut conn, "alice");
    let err = rate_str(&mut conn, &alice, RecipeId::new(7), "3").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn rating_out_of_range_keeps_previous() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    rate_str(&mut conn, &alice, soup.id, "3").unwrap();

    for bad in ["0.5", "5.5", "2.25", "lots"] {
        assert!(rate_str(&mut conn, &alice, soup.id, bad)
            .unwrap_err()
            .is_validation());
    }
    let ratings = query::user_ratings_for_recipe(&mut conn, alice.id(), soup.id).unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].rate.to_string(), "3.0");
}

#[test]
fn review_is_kept_and_describes_itself() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    let rating = rate(
        &mut conn,
        &alice,
        soup.id,
        RatingForm {
            rate: "5",
            review: Some("  Lovely  "),
        },
    )
    .unwrap();
    assert_eq!(rating.review.as_deref(), Some("Lovely"));
    assert_eq!(rating.describe(alice.user(), &soup), "alice rated 5.0 to Soup");

    let err = rate(
        &mut conn,
        &alice,
        soup.id,
        RatingForm {
            rate: "5",
            review: Some(&"x".repeat(251)),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn deleting_user_removes_their_ratings() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let alice = test_user(&mut conn, "alice");
    rate_str(&mut conn, &alice, soup.id, "1").unwrap();

    crate::identity::delete(&mut conn, "alice").unwrap();
    let d = detail(&mut conn, soup.id).unwrap();
    assert!(d.ratings.is_empty());
    assert_eq!(d.average_rating.to_string(), "0.0");
}
