//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, item::create_item_table, list::create_list_table,
    member::create_member_table, profile::create_profile_table,
};

/// Create the tables for the domain models and enable foreign key enforcement
/// on `connection`.
///
/// Foreign keys are declared with `ON DELETE CASCADE`, so deleting a list
/// removes its members, categories and items in one statement; the pragma must
/// be enabled per connection for SQLite to honour them.
///
/// # Errors
///
/// Returns an error if the schema could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_profile_table(&transaction)?;
    create_list_table(&transaction)?;
    create_member_table(&transaction)?;
    create_category_table(&transaction)?;
    create_item_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
