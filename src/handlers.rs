// Copyright 2023 Remi Bernotavicius

//! One function per use case. Each takes the caller's input, validates it, does its reads and
//! writes in a single transaction and hands back something ready to show.

pub mod ingredient;
pub mod meal_plan;
pub mod rating;
pub mod recipe;
