//! The category/item mutation gateway.
//!
//! Every operation here resolves the caller's role on the list implied by the
//! target (item → category → list) through the membership guard, rejects
//! unauthorized callers before touching the store, validates structural
//! input, then delegates the write. Day-to-day item interactions are
//! GUEST-level; restructuring the list's taxonomy is ADMIN-level.

use rusqlite::Connection;

use crate::{
    Error,
    category::{
        Category, CategoryId, CategoryName, categories_for_list, delete_category_row,
        get_category, insert_category, update_category_name,
    },
    guard::require_role,
    item::{Item, ItemId, delete_item_row, get_item, insert_item, items_for_list, update_item_row},
    list::ListId,
    member::Role,
    outcome::{ActionError, ActionResult},
    profile::ProfileId,
};

/// The input for [create_item].
#[derive(Debug, Clone)]
pub struct NewItem {
    /// The category the item belongs to.
    pub category_id: CategoryId,
    /// The name of the item. Must be non-empty.
    pub name: String,
    /// Free-text notes.
    pub notes: String,
}

/// A partial update for [update_item]. Absent fields keep their prior values.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    /// A new name. Must be non-empty when present.
    pub name: Option<String>,
    /// New free-text notes.
    pub notes: Option<String>,
    /// A new purchased flag.
    pub checked: Option<bool>,
    /// A new currently-wanted flag.
    pub selected: Option<bool>,
}

/// Read the categories of a list. Any member may read.
pub fn categories_of(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
) -> ActionResult<Vec<Category>> {
    require_role(connection, auth, list_id, Role::Guest)?;

    categories_for_list(connection, list_id).map_err(ActionError::from)
}

/// Read the items of a list. Any member may read.
pub fn items_of(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
) -> ActionResult<Vec<Item>> {
    require_role(connection, auth, list_id, Role::Guest)?;

    items_for_list(connection, list_id).map_err(ActionError::from)
}

/// Create a category in a list. Requires ADMIN.
pub fn create_category(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
    name: &str,
) -> ActionResult<Category> {
    require_role(connection, auth, list_id, Role::Admin)?;

    let name = CategoryName::new(name)?;

    insert_category(connection, name, list_id).map_err(ActionError::from)
}

/// Rename a category. Requires ADMIN on the owning list.
pub fn rename_category(
    connection: &Connection,
    auth: Option<ProfileId>,
    category_id: CategoryId,
    name: &str,
) -> ActionResult<Category> {
    let category = get_category(connection, category_id)?;
    require_role(connection, auth, category.list_id, Role::Admin)?;

    let name = CategoryName::new(name)?;

    update_category_name(connection, category_id, &name)?;

    Ok(Category { name, ..category })
}

/// Delete a category and, by cascade, its items. Requires ADMIN on the owning
/// list. Returns the pre-deletion snapshot.
pub fn remove_category(
    connection: &Connection,
    auth: Option<ProfileId>,
    category_id: CategoryId,
) -> ActionResult<Category> {
    let category = get_category(connection, category_id)?;
    require_role(connection, auth, category.list_id, Role::Admin)?;

    delete_category_row(connection, category_id)?;

    Ok(category)
}

/// Create an item in a category. Any member of the owning list may create.
pub fn create_item(
    connection: &Connection,
    auth: Option<ProfileId>,
    new_item: &NewItem,
) -> ActionResult<Item> {
    let category = get_category(connection, new_item.category_id)?;
    require_role(connection, auth, category.list_id, Role::Guest)?;

    let name = new_item.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName("Item name").into());
    }

    insert_item(connection, name, &new_item.notes, category.id, category.list_id)
        .map_err(ActionError::from)
}

/// Apply a partial update to an item. Any member of the owning list may
/// update.
pub fn update_item(
    connection: &Connection,
    auth: Option<ProfileId>,
    item_id: ItemId,
    patch: &ItemPatch,
) -> ActionResult<Item> {
    let item = get_item(connection, item_id)?;
    require_role(connection, auth, item.list_id, Role::Guest)?;

    let name = match &patch.name {
        Some(name) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::EmptyName("Item name").into());
            }
            name.to_string()
        }
        None => item.name.clone(),
    };
    let notes = patch.notes.clone().unwrap_or_else(|| item.notes.clone());
    let checked = patch.checked.unwrap_or(item.checked);
    let selected = patch.selected.unwrap_or(item.selected);

    update_item_row(connection, item_id, &name, &notes, checked, selected)?;

    Ok(Item {
        name,
        notes,
        checked,
        selected,
        ..item
    })
}

/// Delete an item. Any member of the owning list may delete — removing
/// individual items is a day-to-day shopping interaction, not a structural
/// one. Returns the pre-deletion snapshot.
pub fn remove_item(
    connection: &Connection,
    auth: Option<ProfileId>,
    item_id: ItemId,
) -> ActionResult<Item> {
    let item = get_item(connection, item_id)?;
    require_role(connection, auth, item.list_id, Role::Guest)?;

    delete_item_row(connection, item_id)?;

    Ok(item)
}
