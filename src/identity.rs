// Copyright 2023 Remi Bernotavicius

//! Local mirror of the identities handed to us by the identity provider.
//!
//! Handlers which act on behalf of a user take an [`AuthenticatedUser`], which can only be
//! obtained from [`authenticate`].

use crate::database;
use crate::database::models::{User, UserId};
use crate::validation;
use crate::{Error, Result};
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    pub fn user(&self) -> &User {
        &self.0
    }
}

pub fn register(conn: &mut database::Connection, new_username: &str) -> Result<User> {
    use database::schema::users::dsl::*;

    let new_username =
        validation::required_text("username", new_username, validation::USERNAME_MAX_LENGTH)?;
    let user = diesel::insert_into(users)
        .values(username.eq(&new_username))
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(|e| {
            Error::from(e).unique_violation_as("username", "a user with that username already exists")
        })?;
    log::info!("registered user {}", user.username);
    Ok(user)
}

/// Resolves an identity supplied by the identity provider. Unknown identities are rejected.
pub fn authenticate(
    conn: &mut database::Connection,
    identity: Option<&str>,
) -> Result<AuthenticatedUser> {
    use database::schema::users::dsl::*;

    let identity = identity.ok_or(Error::Unauthenticated)?;
    let user = users
        .select(User::as_select())
        .filter(username.eq(identity))
        .get_result(conn)
        .optional()?
        .ok_or(Error::Unauthenticated)?;
    Ok(AuthenticatedUser(user))
}

/// Removes a user together with their ratings and meal plan entries.
pub fn delete(conn: &mut database::Connection, delete_username: &str) -> Result<()> {
    use database::schema::users::dsl::*;
    use diesel::delete;

    let deleted = delete(users.filter(username.eq(delete_username))).execute(conn)?;
    if deleted == 0 {
        return Err(Error::not_found("user", delete_username));
    }
    log::info!("deleted user {delete_username}");
    Ok(())
}

#[cfg(test)]
pub fn test_user(conn: &mut database::Connection, name: &str) -> AuthenticatedUser {
    register(conn, name).unwrap();
    authenticate(conn, Some(name)).unwrap()
}

#[test]
fn authenticate_known_user() {
    let mut conn = database::test_connection();
    let user = register(&mut conn, "alice").unwrap();
    let authenticated = authenticate(&mut conn, Some("alice")).unwrap();
    assert_eq!(authenticated.id(), user.id);
    assert_eq!(authenticated.user().username, "alice");
}

#[test]
fn authenticate_rejects_unknown_and_anonymous() {
    let mut conn = database::test_connection();
    register(&mut conn, "alice").unwrap();
    assert!(matches!(
        authenticate(&mut conn, Some("mallory")),
        Err(Error::Unauthenticated)
    ));
    assert!(matches!(
        authenticate(&mut conn, None),
        Err(Error::Unauthenticated)
    ));
}

#[test]
fn register_duplicate_username() {
    let mut conn = database::test_connection();
    register(&mut conn, "alice").unwrap();
    assert!(register(&mut conn, "alice").unwrap_err().is_validation());
    assert!(register(&mut conn, " ").unwrap_err().is_validation());
}

#[test]
fn delete_unknown_user() {
    let mut conn = database::test_connection();
    assert!(delete(&mut conn, "nobody").unwrap_err().is_not_found());
}
