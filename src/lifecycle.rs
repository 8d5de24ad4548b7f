//! The list lifecycle: creation with default content, reset to defaults,
//! partial update, and cascading removal.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    category::{CategoryName, delete_categories_for_list, insert_category},
    guard::require_role,
    item::insert_item,
    list::{
        InviteCode, List, ListId, ListName, delete_list_row, get_list, insert_list,
        update_list_row,
    },
    member::{Role, insert_member},
    outcome::{ActionError, ActionResult},
    profile::ProfileId,
};

/// The fixed, ordered template a fresh list is populated with: each category
/// name followed by its item names, inserted in template order.
pub const DEFAULT_TEMPLATE: &[(&str, &[&str])] = &[
    ("Produce", &["Apples", "Bananas", "Carrots", "Lettuce", "Tomatoes"]),
    ("Dairy", &["Milk", "Butter", "Cheese", "Yoghurt"]),
    ("Bakery", &["Bread", "Bagels"]),
    ("Meat & Fish", &["Chicken", "Mince", "Salmon"]),
    ("Pantry", &["Pasta", "Rice", "Olive oil", "Coffee"]),
    ("Frozen", &["Peas", "Ice cream"]),
    ("Household", &["Dish soap", "Paper towels"]),
];

// Codes are 16 random alphanumeric characters, so a clash means either
// astronomical luck or a broken RNG; a handful of retries covers the former.
const INVITE_CODE_ATTEMPTS: u32 = 5;

/// A partial update for [update_list]. Absent fields keep their prior values,
/// so an empty patch is a successful no-op.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    /// A new name for the list. Must be non-empty when present.
    pub name: Option<String>,
    /// A new value for the private flag.
    pub private: Option<bool>,
}

/// Create a list owned by the signed-in profile.
///
/// The list row, the creator's ADMIN membership and the default content are
/// written in a single transaction: either all three land or none do, so no
/// reader ever observes a list without an ADMIN member.
pub fn create_list(
    connection: &Connection,
    auth: Option<ProfileId>,
    name: &str,
) -> ActionResult<List> {
    let profile_id = auth.ok_or(ActionError::NotAuthenticated)?;

    let name = ListName::new(name)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let list = insert_list_with_fresh_code(&transaction, &name, profile_id)?;
    insert_member(&transaction, list.id, profile_id, Role::Admin)?;
    insert_default_content(&transaction, list.id)?;

    transaction.commit().map_err(Error::from)?;

    Ok(list)
}

fn insert_list_with_fresh_code(
    connection: &Connection,
    name: &ListName,
    creator_id: ProfileId,
) -> ActionResult<List> {
    for _ in 0..INVITE_CODE_ATTEMPTS {
        match insert_list(connection, name, &InviteCode::generate(), creator_id) {
            Err(Error::DuplicateInviteCode) => continue,
            result => return result.map_err(ActionError::from),
        }
    }

    tracing::error!("could not generate a unique invite code after {INVITE_CODE_ATTEMPTS} attempts");
    Err(ActionError::Server(Error::DuplicateInviteCode))
}

fn insert_default_content(connection: &Connection, list_id: ListId) -> Result<(), Error> {
    for (category_name, item_names) in DEFAULT_TEMPLATE {
        let category = insert_category(
            connection,
            CategoryName::new_unchecked(category_name),
            list_id,
        )?;

        for item_name in *item_names {
            insert_item(connection, item_name, "", category.id, list_id)?;
        }
    }

    Ok(())
}

/// Reset a list's content to the default template.
///
/// Deletes the list's existing categories (their items cascade) and recreates
/// the template, in one transaction so concurrent readers never observe a
/// half-populated list. Used at list creation and as an explicit reset.
///
/// # Errors
///
/// Fails with [ActionError::NotFound] if the list does not exist.
pub fn populate(connection: &Connection, list_id: ListId) -> ActionResult<()> {
    get_list(connection, list_id)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    delete_categories_for_list(&transaction, list_id)?;
    insert_default_content(&transaction, list_id)?;

    transaction.commit().map_err(Error::from)?;

    Ok(())
}

/// Apply a partial update to a list. Requires ADMIN.
pub fn update_list(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
    patch: &ListPatch,
) -> ActionResult<List> {
    require_role(connection, auth, list_id, Role::Admin)?;

    let current = get_list(connection, list_id)?;

    let name = match &patch.name {
        Some(name) => ListName::new(name)?,
        None => current.name.clone(),
    };
    let private = patch.private.unwrap_or(current.private);

    update_list_row(connection, list_id, &name, private)?;

    Ok(List {
        name,
        private,
        ..current
    })
}

/// Delete a list and everything it owns: members, categories and items.
/// Requires ADMIN. Returns the pre-deletion snapshot.
pub fn remove_list(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
) -> ActionResult<List> {
    require_role(connection, auth, list_id, Role::Admin)?;

    let snapshot = get_list(connection, list_id)?;
    delete_list_row(connection, list_id)?;

    Ok(snapshot)
}
