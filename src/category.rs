//! This file defines the `Category` type, a named grouping of items owned by
//! exactly one list, and the category table.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, list::ListId};

/// The ID of a category row.
pub type CategoryId = i64;

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName("Category name"))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named grouping of items, e.g. 'Produce', 'Dairy', 'Household'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The category's ID in the application database.
    pub id: CategoryId,

    /// The name of the category.
    pub name: CategoryName,

    /// The list that owns the category.
    pub list_id: ListId,
}

/// Create the category table.
pub(crate) fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                list_id INTEGER NOT NULL,
                FOREIGN KEY(list_id) REFERENCES list(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        list_id: ListId::new(row.get(2)?),
    })
}

/// Insert a category into the database.
///
/// # Errors
///
/// Returns [Error::InvalidForeignKey] if `list_id` does not refer to a valid
/// list, or [Error::SqlError] for any other SQL error.
pub fn insert_category(
    connection: &Connection,
    name: CategoryName,
    list_id: ListId,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, list_id) VALUES (?1, ?2)",
        (name.as_ref(), list_id.as_i64()),
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name,
        list_id,
    })
}

/// Get the category with an ID equal to `category_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no such category exists.
pub fn get_category(connection: &Connection, category_id: CategoryId) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, list_id FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Get all categories owned by a list, in creation order.
pub fn categories_for_list(
    connection: &Connection,
    list_id: ListId,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, list_id FROM category WHERE list_id = :list_id ORDER BY id")?
        .query_map(&[(":list_id", &list_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

pub(crate) fn update_category_name(
    connection: &Connection,
    category_id: CategoryId,
    name: &CategoryName,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (name.as_ref(), category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(crate) fn delete_category_row(
    connection: &Connection,
    category_id: CategoryId,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM category WHERE id = ?1", (category_id,))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(crate) fn delete_categories_for_list(
    connection: &Connection,
    list_id: ListId,
) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM category WHERE list_id = ?1", (list_id.as_i64(),))
        .map_err(|error| error.into())
}

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(
            CategoryName::new(""),
            Err(Error::EmptyName("Category name"))
        );
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        assert!(CategoryName::new("🔥").is_ok());
    }
}
