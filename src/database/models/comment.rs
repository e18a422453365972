use diesel::prelude::*;

use super::user::User;
use crate::{
    app::AppError,
    database::db_utils::DbConnection,
    schema::{comments, users},
};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    pub id: i32,
    pub author_id: i32,
    pub post_id: i32,
    pub text: String,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
struct CommentInsert<'a> {
    author_id: i32,
    post_id: i32,
    text: &'a str,
}

impl Comment {
    /** Creates a comment on the post specified */
    pub fn new(
        conn: &mut DbConnection,
        post_id: i32,
        author_id: i32,
        text: &str,
    ) -> Result<Comment, AppError> {
        let record = CommentInsert {
            author_id,
            post_id,
            text,
        };

        let comment = diesel::insert_into(comments::table)
            .values(&record)
            .returning(Comment::as_returning())
            .get_result(conn)?;

        Ok(comment)
    }

    /** Returns all comments posted on a post, oldest first, with their authors */
    pub fn find_by_post_with_authors(
        conn: &mut DbConnection,
        post_id: i32,
    ) -> Result<Vec<(Comment, User)>, AppError> {
        let found = comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(post_id))
            .order(comments::id.asc())
            .select((Comment::as_select(), User::as_select()))
            .load(conn)?;

        Ok(found)
    }

    #[cfg(test)]
    pub fn count_by_post(conn: &mut DbConnection, post_id: i32) -> Result<i64, AppError> {
        let count = comments::table
            .filter(comments::post_id.eq(post_id))
            .count()
            .get_result(conn)?;

        Ok(count)
    }

    /// Deletes every comment of a post. Only called from inside the post deletion transaction.
    pub(super) fn delete_by_post(conn: &mut DbConnection, post_id: i32) -> Result<usize, AppError> {
        let removed = diesel::delete(comments::table.filter(comments::post_id.eq(post_id)))
            .execute(conn)?;

        Ok(removed)
    }
}
