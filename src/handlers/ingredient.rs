// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{Ingredient, IngredientId, PictureRef};
use crate::query;
use crate::validation;
use crate::{Error, Result};

const DUPLICATE: &str = "this ingredient already exists";

pub struct IngredientForm<'a> {
    pub title: &'a str,
    pub picture: PictureRef,
}

pub fn add(conn: &mut database::Connection, form: IngredientForm<'_>) -> Result<Ingredient> {
    let title = validation::required_text("title", form.title, validation::TITLE_MAX_LENGTH)?;
    validation::picture(&form.picture)?;

    let ingredient = conn.immediate_transaction(|conn| {
        if query::ingredient_title_taken(conn, &title)? {
            log::warn!("duplicate ingredient {title:?}");
            return Err(Error::validation("title", DUPLICATE));
        }
        query::insert_ingredient(conn, &title, &form.picture)
            .map_err(|e| e.unique_violation_as("title", DUPLICATE))
    })?;

    log::info!("The ingredient has been added successfully: {ingredient}");
    Ok(ingredient)
}

pub fn list(conn: &mut database::Connection) -> Result<Vec<Ingredient>> {
    query::all_ingredients(conn)
}

/// Deletes the ingredient and every recipe line that uses it.
pub fn delete(conn: &mut database::Connection, id: IngredientId) -> Result<()> {
    if !query::delete_ingredient(conn, id)? {
        return Err(Error::not_found("ingredient", id));
    }
    log::info!("deleted ingredient {id}");
    Ok(())
}

#[cfg(test)]
pub fn test_ingredient(conn: &mut database::Connection, title: &str) -> Ingredient {
    add(
        conn,
        IngredientForm {
            title,
            picture: PictureRef::new(format!("images/{title}.png")),
        },
    )
    .unwrap()
}

#[test]
fn add_and_list() {
    let mut conn = database::test_connection();
    let salt = test_ingredient(&mut conn, "Salt");
    test_ingredient(&mut conn, "Basil");
    assert_eq!(salt.title, "Salt");
    assert_eq!(salt.picture.as_str(), "images/Salt.png");

    let titles: Vec<_> = list(&mut conn)
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, ["Basil", "Salt"]);
}

#[test]
fn duplicate_title_differing_in_case() {
    let mut conn = database::test_connection();
    test_ingredient(&mut conn, "Salt");

    let err = add(
        &mut conn,
        IngredientForm {
            title: "salt",
            picture: PictureRef::new("images/salt.png"),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "title: this ingredient already exists");
    assert_eq!(list(&mut conn).unwrap().len(), 1);
}

#[test]
fn add_requires_title_and_picture() {
    let mut conn = database::test_connection();
    let err = add(
        &mut conn,
        IngredientForm {
            title: "",
            picture: PictureRef::new("images/a.png"),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());

    let err = add(
        &mut conn,
        IngredientForm {
            title: "Pepper",
            picture: PictureRef::new(""),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn delete_missing_ingredient() {
    let mut conn = database::test_connection();
    let salt = test_ingredient(&mut conn, "Salt");
    delete(&mut conn, salt.id).unwrap();
    assert!(delete(&mut conn, salt.id).unwrap_err().is_not_found());
    assert!(list(&mut conn).unwrap().is_empty());
}

#[test]
fn duplicate_title_differing_in_non_ascii_case() {
    let mut conn = database::test_connection();
    test_ingredient(&mut conn, "Ñame");

    let err = add(
        &mut conn,
        IngredientForm {
            title: "ñame",
            picture: PictureRef::new("images/name.png"),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(list(&mut conn).unwrap().len(), 1);
}

#[test]
fn delete_removes_recipe_lines() {
    use crate::handlers::recipe::{detail, test_attach, test_recipe};

    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "Soup", "Simmer");
    let salt = test_ingredient(&mut conn, "Salt");
    let leek = test_ingredient(&mut conn, "Leek");
    test_attach(&mut conn, &soup, &salt, "1 tsp");
    test_attach(&mut conn, &soup, &leek, "2");

    delete(&mut conn, salt.id).unwrap();
    let lines: Vec<_> = detail(&mut conn, soup.id)
        .unwrap()
        .ingredients
        .into_iter()
        .map(|(_, ingredient)| ingredient.title)
        .collect();
    assert_eq!(lines, ["Leek"]);

    delete(&mut conn, leek.id).unwrap();
    assert!(detail(&mut conn, soup.id).unwrap().ingredients.is_empty());
}
