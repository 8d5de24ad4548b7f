//! This file defines the `Item` type, a purchasable entry owned by one
//! category, and the item table.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId, list::ListId};

/// The ID of an item row.
pub type ItemId = i64;

/// A purchasable entry within one category.
///
/// `list_id` duplicates the owning category's list so items for a whole list
/// can be read without a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Item {
    /// The item's ID in the application database.
    pub id: ItemId,

    /// The name of the item.
    pub name: String,

    /// Free-text notes, e.g. brand or quantity.
    pub notes: String,

    /// Whether the item has been purchased.
    pub checked: bool,

    /// Whether the item is currently wanted.
    pub selected: bool,

    /// The category that owns the item.
    pub category_id: CategoryId,

    /// The list the owning category belongs to.
    pub list_id: ListId,
}

/// Create the item table.
pub(crate) fn create_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS item (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                checked INTEGER NOT NULL DEFAULT 0,
                selected INTEGER NOT NULL DEFAULT 0,
                category_id INTEGER NOT NULL,
                list_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(list_id) REFERENCES list(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_item_row(row: &Row) -> Result<Item, rusqlite::Error> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        notes: row.get(2)?,
        checked: row.get(3)?,
        selected: row.get(4)?,
        category_id: row.get(5)?,
        list_id: ListId::new(row.get(6)?),
    })
}

/// Insert an item into the database. New items start unchecked and unselected.
///
/// # Errors
///
/// Returns [Error::InvalidForeignKey] if `category_id` or `list_id` is
/// dangling, or [Error::SqlError] for any other SQL error.
pub fn insert_item(
    connection: &Connection,
    name: &str,
    notes: &str,
    category_id: CategoryId,
    list_id: ListId,
) -> Result<Item, Error> {
    connection.execute(
        "INSERT INTO item (name, notes, category_id, list_id) VALUES (?1, ?2, ?3, ?4)",
        (name, notes, category_id, list_id.as_i64()),
    )?;

    Ok(Item {
        id: connection.last_insert_rowid(),
        name: name.to_string(),
        notes: notes.to_string(),
        checked: false,
        selected: false,
        category_id,
        list_id,
    })
}

/// Get the item with an ID equal to `item_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no such item exists.
pub fn get_item(connection: &Connection, item_id: ItemId) -> Result<Item, Error> {
    connection
        .prepare(
            "SELECT id, name, notes, checked, selected, category_id, list_id
                FROM item WHERE id = :id",
        )?
        .query_row(&[(":id", &item_id)], map_item_row)
        .map_err(|error| error.into())
}

/// Get all items owned by a list, in creation order.
pub fn items_for_list(connection: &Connection, list_id: ListId) -> Result<Vec<Item>, Error> {
    connection
        .prepare(
            "SELECT id, name, notes, checked, selected, category_id, list_id
                FROM item WHERE list_id = :list_id ORDER BY id",
        )?
        .query_map(&[(":list_id", &list_id.as_i64())], map_item_row)?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

pub(crate) fn update_item_row(
    connection: &Connection,
    item_id: ItemId,
    name: &str,
    notes: &str,
    checked: bool,
    selected: bool,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE item SET name = ?1, notes = ?2, checked = ?3, selected = ?4 WHERE id = ?5",
        (name, notes, checked, selected, item_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(crate) fn delete_item_row(connection: &Connection, item_id: ItemId) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM item WHERE id = ?1", (item_id,))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
