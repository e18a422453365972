use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::{
    app::AppError,
    auth::ADMIN_USER_ID,
    database::db_utils::DbConnection,
    schema::users,
};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Argon2 PHC string, never the plain password
    pub password: String,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUser<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

impl User {
    /// Pushes a new user in the database.
    /// Returns `None` when the email is already taken.
    ///
    /// # Example
    /// ```
    /// let user = User::new(
    ///     &mut conn,
    ///     "reader@example.com",
    ///     &password::hash_password("secret")?,
    ///     "Reader")?;
    /// ```
    pub fn new(
        conn: &mut DbConnection,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Option<User>, AppError> {
        let to_insert = NewUser {
            email,
            password: password_hash,
            name,
        };

        match diesel::insert_into(users::table)
            .values(&to_insert)
            .returning(User::as_returning())
            .get_result(conn)
        {
            Ok(user) => Ok(Some(user)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /** Returns the user with the id specified */
    pub fn find_by_id(conn: &mut DbConnection, user_id: i32) -> Result<Option<User>, AppError> {
        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first(conn)
            .optional()?;

        Ok(user)
    }

    /// Returns the user registered with `email`, if any.
    pub fn find_by_email(conn: &mut DbConnection, email: &str) -> Result<Option<User>, AppError> {
        let user = users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(conn)
            .optional()?;

        Ok(user)
    }

    #[cfg(test)]
    pub fn count_by_email(conn: &mut DbConnection, email: &str) -> Result<i64, AppError> {
        let count = users::table
            .filter(users::email.eq(email))
            .count()
            .get_result(conn)?;

        Ok(count)
    }

    pub fn is_admin(&self) -> bool {
        self.id == ADMIN_USER_ID
    }
}
