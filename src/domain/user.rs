use crate::domain::user::driven_ports::{PasswordVerifier, UserReader, UserWriter};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use derive_more::Display;
use tracing::info;
use uuid::Uuid;

/// A stored user whose credentials can authenticate API calls
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
}

/// A user which hasn't been stored yet. Only the username is displayed.
#[derive(PartialEq, Eq, Debug, Clone, Display)]
#[display("{username}")]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// A username/password pair presented by a caller
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        /// All users registered under a username. Usernames aren't unique, so there may be several.
        async fn users_named(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Stores a new user, letting the store assign its ID
        async fn save(
            &self,
            new_user: &NewUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, anyhow::Error>;
    }

    /// Checks a presented password against the form stored on the user record.
    /// How passwords are encoded for storage is up to the implementation.
    pub trait PasswordVerifier {
        fn verify(&self, presented: &str, stored: &str) -> bool;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait UserPort {
        /// True if some stored user has the given username and a matching password
        async fn verify_credentials(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl UserReader,
            verifier: &impl PasswordVerifier,
        ) -> Result<bool, anyhow::Error>;

        /// Creates the user unless one with the same username already exists.
        /// Returns the new user, or [None] if nothing was created.
        async fn seed_user(
            &self,
            new_user: &NewUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl UserReader,
            u_writer: &impl UserWriter,
        ) -> Result<Option<User>, anyhow::Error>;
    }
}

pub struct UserService;

impl driving_ports::UserPort for UserService {
    async fn verify_credentials(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl UserReader,
        verifier: &impl PasswordVerifier,
    ) -> Result<bool, anyhow::Error> {
        let candidates = u_reader
            .users_named(&credentials.username, &mut *ext_cxn)
            .await
            .context("looking up users to verify credentials")?;

        Ok(candidates
            .iter()
            .any(|user| verifier.verify(&credentials.password, &user.password)))
    }

    async fn seed_user(
        &self,
        new_user: &NewUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl UserReader,
        u_writer: &impl UserWriter,
    ) -> Result<Option<User>, anyhow::Error> {
        let existing = u_reader
            .users_named(&new_user.username, &mut *ext_cxn)
            .await
            .context("checking for an existing user before seeding")?;
        if !existing.is_empty() {
            info!("User {new_user} already exists, not seeding it");
            return Ok(None);
        }

        let created = u_writer
            .save(new_user, &mut *ext_cxn)
            .await
            .context("seeding a user")?;
        info!("Seeded user {new_user} with ID {}", created.id);

        Ok(Some(created))
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    pub struct InMemoryUserPersistence {
        pub created_users: Vec<User>,
        pub connectivity: Connectivity,
    }

    impl InMemoryUserPersistence {
        pub fn new() -> InMemoryUserPersistence {
            InMemoryUserPersistence {
                created_users: Vec::new(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_with_users(users: &[NewUser]) -> InMemoryUserPersistence {
            InMemoryUserPersistence {
                created_users: users.iter().map(user_from_create).collect(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryUserPersistence> {
            RwLock::new(InMemoryUserPersistence::new())
        }
    }

    impl driven_ports::UserReader for RwLock<InMemoryUserPersistence> {
        async fn users_named(
            &self,
            username: &str,
            _: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error> {
            let persister = self.read().expect("user read rwlock poisoned");
            persister.connectivity.blow_up_if_disconnected()?;

            Ok(persister
                .created_users
                .iter()
                .filter(|user| user.username == username)
                .cloned()
                .collect())
        }
    }

    impl driven_ports::UserWriter for RwLock<InMemoryUserPersistence> {
        async fn save(
            &self,
            new_user: &NewUser,
            _: &mut impl ExternalConnectivity,
        ) -> Result<User, anyhow::Error> {
            let mut persister = self.write().expect("user write rwlock poisoned");
            persister.connectivity.blow_up_if_disconnected()?;

            let user = user_from_create(new_user);
            persister.created_users.push(user.clone());

            Ok(user)
        }
    }

    /// Compares passwords verbatim, standing in for a real verifier
    pub struct ExactMatchVerifier;

    impl driven_ports::PasswordVerifier for ExactMatchVerifier {
        fn verify(&self, presented: &str, stored: &str) -> bool {
            presented == stored
        }
    }

    pub fn user_create(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    pub fn user_from_create(create_request: &NewUser) -> User {
        User {
            id: Uuid::new_v4(),
            username: create_request.username.clone(),
            password: create_request.password.clone(),
        }
    }

    pub struct MockUserService {
        pub verify_credentials_result: FakeImplementation<Credentials, anyhow::Result<bool>>,
    }

    impl MockUserService {
        pub fn new() -> MockUserService {
            MockUserService {
                verify_credentials_result: FakeImplementation::new(),
            }
        }
    }

    impl driving_ports::UserPort for Mutex<MockUserService> {
        async fn verify_credentials(
            &self,
            credentials: &Credentials,
            _ext_cxn: &mut impl ExternalConnectivity,
            _u_reader: &impl UserReader,
            _verifier: &impl PasswordVerifier,
        ) -> Result<bool, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock user service mutex poisoned");
            locked_self
                .verify_credentials_result
                .save_arguments(credentials.clone());

            locked_self.verify_credentials_result.return_value_anyhow()
        }

        async fn seed_user(
            &self,
            _new_user: &NewUser,
            _ext_cxn: &mut impl ExternalConnectivity,
            _u_reader: &impl UserReader,
            _u_writer: &impl UserWriter,
        ) -> Result<Option<User>, anyhow::Error> {
            unimplemented!("seeding isn't reachable from the HTTP layer")
        }
    }
}
