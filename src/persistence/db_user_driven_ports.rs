use crate::domain;
use crate::domain::user::{NewUser, User};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query_as};
use uuid::Uuid;

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            username: value.username,
            password: value.password,
        }
    }
}

pub struct DbReadUsers;

impl domain::user::driven_ports::UserReader for DbReadUsers {
    async fn users_named(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<User>, Error> {
        let mut connection = ext_cxn.database_cxn().await?;

        let users: Vec<User> = query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.password FROM app_user u WHERE u.username = $1",
        )
        .bind(username)
        .fetch_all(connection.borrow_connection())
        .await
        .context("Fetching users by name")?
        .into_iter()
        .map(User::from)
        .collect();

        Ok(users)
    }
}

pub struct DbWriteUsers;

impl domain::user::driven_ports::UserWriter for DbWriteUsers {
    async fn save(
        &self,
        new_user: &NewUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<User, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let user = query_as::<_, UserRow>(
            "INSERT INTO app_user(username, password) VALUES ($1, $2) \
             RETURNING app_user.id, app_user.username, app_user.password",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .context("Inserting new user")?;

        Ok(user.into())
    }
}
