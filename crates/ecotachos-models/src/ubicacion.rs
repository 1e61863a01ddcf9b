//! Location hierarchy: provincia > ciudad > canton.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provincia {
    pub id: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciudad {
    pub id: i64,
    pub nombre: String,
    pub provincia: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canton {
    pub id: i64,
    pub nombre: String,
    pub ciudad: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProvincia {
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCiudad {
    pub nombre: String,
    pub provincia: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CantonInput {
    pub nombre: String,
    pub ciudad: i64,
}

/// Case-insensitive lookup by name.
pub fn find_by_name<'a, T, F>(items: &'a [T], name: &str, get_name: F) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = name.trim().to_lowercase();
    items.iter().find(|item| get_name(item).to_lowercase() == needle)
}

/// Capitalize the first letter and lowercase the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
