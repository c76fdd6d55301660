// Copyright 2023 Remi Bernotavicius

//! Field rules checked before anything is written to the database.

use crate::database::models::{DayOfWeek, MealSlot, PictureRef, Rate};
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::str::FromStr as _;

pub const TITLE_MAX_LENGTH: usize = 264;
pub const INSTRUCTION_MAX_LENGTH: usize = 264;
pub const AMOUNT_MAX_LENGTH: usize = 100;
pub const REVIEW_MAX_LENGTH: usize = 250;
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Trims `value` and checks it is non-empty and at most `max_length` characters.
pub fn required_text(field: &'static str, value: &str, max_length: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(field, "this field is required"));
    }
    check_length(field, value, max_length)?;
    Ok(value.into())
}

/// Like [`required_text`], but blank input becomes `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            check_length(field, value, max_length)?;
            Ok(Some(value.into()))
        }
    }
}

fn check_length(field: &'static str, value: &str, max_length: usize) -> Result<()> {
    let length = value.chars().count();
    if length > max_length {
        return Err(Error::validation(
            field,
            format!("ensure this value has at most {max_length} characters (it has {length})"),
        ));
    }
    Ok(())
}

pub fn picture(picture: &PictureRef) -> Result<()> {
    if picture.as_str().trim().is_empty() {
        return Err(Error::validation("picture", "this field is required"));
    }
    Ok(())
}

/// Accepts values in `[1.0, 5.0]` with at most one fractional digit.
pub fn rate(value: Decimal) -> Result<Rate> {
    if value < Rate::MIN.to_decimal() {
        return Err(Error::validation(
            "rate",
            "ensure this value is greater than or equal to 1.0",
        ));
    }
    if value > Rate::MAX.to_decimal() {
        return Err(Error::validation(
            "rate",
            "ensure this value is less than or equal to 5.0",
        ));
    }
    if value.normalize().scale() > 1 {
        return Err(Error::validation(
            "rate",
            "ensure that there are no more than 1 decimal place",
        ));
    }

    let mut tenths = value;
    tenths.rescale(1);
    let tenths = i32::try_from(tenths.mantissa())
        .map_err(|_| Error::validation("rate", "value out of range"))?;
    Ok(Rate::from_tenths(tenths))
}

pub fn parse_rate(value: &str) -> Result<Rate> {
    let value = Decimal::from_str(value.trim())
        .map_err(|_| Error::validation("rate", "enter a number"))?;
    rate(value)
}

pub fn day(value: &str) -> Result<DayOfWeek> {
    DayOfWeek::from_str(value.trim()).map_err(|_| {
        Error::validation(
            "day",
            format!("select a valid choice. {value:?} is not one of the available choices"),
        )
    })
}

pub fn slot(value: &str) -> Result<MealSlot> {
    MealSlot::from_str(value.trim()).map_err(|_| {
        Error::validation(
            "slot",
            format!("select a valid choice. {value:?} is not one of the available choices"),
        )
    })
}

#[test]
fn required_text_rules() {
    assert_eq!(required_text("title", "  Salt ", 264).unwrap(), "Salt");
    assert!(required_text("title", "   ", 264).unwrap_err().is_validation());

    let long = "a".repeat(265);
    let err = required_text("title", &long, 264).unwrap_err();
    assert_eq!(
        err.to_string(),
        "title: ensure this value has at most 264 characters (it has 265)"
    );
    assert!(required_text("title", &"é".repeat(264), 264).is_ok());
}

#[test]
fn optional_text_rules() {
    assert_eq!(optional_text("review", None, 250).unwrap(), None);
    assert_eq!(optional_text("review", Some("  "), 250).unwrap(), None);
    assert_eq!(
        optional_text("review", Some("tasty"), 250).unwrap(),
        Some("tasty".into())
    );
    assert!(optional_text("review", Some(&"x".repeat(251)), 250).is_err());
}

#[test]
fn rate_bounds_and_precision() {
    assert_eq!(parse_rate("1").unwrap(), Rate::from_tenths(10));
    assert_eq!(parse_rate("3.5").unwrap(), Rate::from_tenths(35));
    assert_eq!(parse_rate(" 5.0 ").unwrap(), Rate::MAX);
    assert_eq!(parse_rate("4.50").unwrap().to_string(), "4.5");

    assert!(parse_rate("0.9").unwrap_err().is_validation());
    assert!(parse_rate("5.1").unwrap_err().is_validation());
    assert!(parse_rate("3.25").unwrap_err().is_validation());
    assert!(parse_rate("three").unwrap_err().is_validation());
}

#[test]
fn enum_fields() {
    assert_eq!(day("Tue").unwrap(), DayOfWeek::Tuesday);
    assert_eq!(slot("LU").unwrap(), MealSlot::Lunch);
    assert!(day("XYZ").unwrap_err().is_validation());
    assert!(slot("supper").unwrap_err().is_validation());
}
