use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use docket_crypto::CredentialHasher;
use docket_store::{Collection, Database, Documents, StoreError};
use docket_types::{DocId, Fields, Query, Value};

use crate::error::{GateError, GateResult};

/// Name of the reserved collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const ROLE: &str = "role";

/// Privilege level of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(GateError::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

/// Check that a password and its confirmation agree.
pub fn confirm_password(password: &str, confirmation: &str) -> GateResult<()> {
    if password != confirmation {
        return Err(GateError::InvalidInput("passwords do not match".into()));
    }
    Ok(())
}

fn by_username(username: &str) -> Query {
    Query::new(USERNAME, Value::Text(username.to_string()))
}

fn admins() -> Query {
    Query::new(ROLE, Role::Admin.as_str())
}

fn validate_credentials(username: &str, password: &str) -> GateResult<()> {
    if username.is_empty() {
        return Err(GateError::InvalidInput("username must not be empty".into()));
    }
    if password.is_empty() {
        return Err(GateError::InvalidInput("password must not be empty".into()));
    }
    Ok(())
}

/// User management over the reserved [`USERS_COLLECTION`].
///
/// Usernames are unique. Passwords are stored only as
/// [`CredentialHasher::PASSWORD`] digests. Check-then-insert flows
/// (bootstrap, user creation) run inside a single
/// [`Collection::modify`] scope, so concurrent callers cannot both pass the
/// check.
#[derive(Clone, Debug)]
pub struct UserDirectory {
    db: Database,
}

impl UserDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The reserved collection, or `None` if it was never materialized.
    fn collection(&self) -> GateResult<Option<Collection>> {
        match self.db.collection(USERS_COLLECTION) {
            Ok(c) => Ok(Some(c)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Hash a credential pair the way it is stored.
    pub fn hash_credential(username: &str, password: &str) -> String {
        CredentialHasher::PASSWORD.hash(username, password)
    }

    /// Returns `true` iff exactly one user document carries `username`.
    pub fn user_exists(&self, username: &str) -> GateResult<bool> {
        let Some(users) = self.collection()? else {
            return Ok(false);
        };
        let query = by_username(username);
        Ok(users.inspect(|docs| docs.count(&query) == 1)?)
    }

    /// Returns `true` if at least one user has the admin role.
    pub fn admin_exists(&self) -> GateResult<bool> {
        let Some(users) = self.collection()? else {
            return Ok(false);
        };
        let query = admins();
        Ok(users.inspect(|docs| docs.any(&query))?)
    }

    /// Returns `true` iff a user with this name and password exists and has
    /// the admin role.
    pub fn authenticate_admin(&self, username: &str, password: &str) -> GateResult<bool> {
        let Some(users) = self.collection()? else {
            return Ok(false);
        };
        let candidates = users.find(&by_username(username))?;
        Ok(candidates.iter().any(|doc| {
            let role_ok = doc.get(ROLE).and_then(Value::as_text) == Some(Role::Admin.as_str());
            let password_ok = doc
                .get(PASSWORD)
                .and_then(Value::as_text)
                .is_some_and(|stored| {
                    CredentialHasher::PASSWORD.verify(username, password, stored)
                });
            role_ok && password_ok
        }))
    }

    /// Create the first admin.
    ///
    /// Only permitted while no admin exists; afterwards this fails with
    /// `Forbidden`. Materializes the reserved collection if needed.
    pub fn bootstrap_admin(&self, username: &str, password: &str) -> GateResult<DocId> {
        validate_credentials(username, password)?;
        let users = self.db.ensure(USERS_COLLECTION)?;
        let id = users.modify(|docs| {
            if docs.any(&admins()) {
                return Err(GateError::Forbidden("an admin already exists".into()));
            }
            insert_user(docs, username, password, Role::Admin)
        })?;
        info!(username, %id, "bootstrap admin created");
        Ok(id)
    }

    /// Create a user. Callers are responsible for authorization; see
    /// [`AccessGate::create_user`](crate::AccessGate::create_user).
    pub(crate) fn add_user(&self, username: &str, password: &str, role: Role) -> GateResult<DocId> {
        validate_credentials(username, password)?;
        let users = self.db.ensure(USERS_COLLECTION)?;
        let id = users.modify(|docs| insert_user(docs, username, password, role))?;
        info!(username, %role, %id, "user created");
        Ok(id)
    }
}

fn insert_user(
    docs: &mut Documents,
    username: &str,
    password: &str,
    role: Role,
) -> GateResult<DocId> {
    if docs.any(&by_username(username)) {
        return Err(GateError::UserExists(username.to_string()));
    }
    let mut fields = Fields::new();
    fields.insert(USERNAME.into(), Value::Text(username.to_string()));
    fields.insert(
        PASSWORD.into(),
        Value::Text(UserDirectory::hash_credential(username, password)),
    );
    fields.insert(ROLE.into(), Value::Text(role.as_str().to_string()));
    Ok(docs.insert(fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_store::StoreConfig;

    fn directory() -> (tempfile::TempDir, UserDirectory) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(StoreConfig::new(dir.path())).unwrap();
        (dir, UserDirectory::new(db))
    }

    #[test]
    fn role_parse_and_display() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn confirm_password_mismatch() {
        assert!(confirm_password("a", "a").is_ok());
        assert!(matches!(confirm_password("a", "b"), Err(GateError::InvalidInput(_))));
    }

    #[test]
    fn empty_directory_answers_negatively() {
        let (_dir, users) = directory();
        assert!(!users.user_exists("root").unwrap());
        assert!(!users.admin_exists().unwrap());
        assert!(!users.authenticate_admin("root", "secret").unwrap());
    }

    #[test]
    fn bootstrap_then_authenticate() {
        let (_dir, users) = directory();
        users.bootstrap_admin("root", "secret").unwrap();
        assert!(users.admin_exists().unwrap());
        assert!(users.user_exists("root").unwrap());
        assert!(users.authenticate_admin("root", "secret").unwrap());
        assert!(!users.authenticate_admin("root", "wrong").unwrap());
        assert!(!users.authenticate_admin("nobody", "secret").unwrap());
    }

    #[test]
    fn bootstrap_only_once() {
        let (_dir, users) = directory();
        users.bootstrap_admin("root", "secret").unwrap();
        assert!(matches!(
            users.bootstrap_admin("other", "pw"),
            Err(GateError::Forbidden(_))
        ));
        assert!(!users.user_exists("other").unwrap());
    }

    #[test]
    fn concurrent_bootstrap_commits_one_admin() {
        use std::thread;

        let (_dir, users) = directory();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let users = users.clone();
                thread::spawn(move || users.bootstrap_admin(&format!("admin{i}"), "pw").is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
        let stored = users.db.collection(USERS_COLLECTION).unwrap();
        assert_eq!(stored.len().unwrap(), 1);
    }

    #[test]
    fn password_is_stored_hashed() {
        let (dir, users) = directory();
        users.bootstrap_admin("root", "secret").unwrap();
        let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert!(!raw.contains("\"secret\""));
        assert!(raw.contains(&UserDirectory::hash_credential("root", "secret")));
    }

    #[test]
    fn plain_user_is_not_admin() {
        let (_dir, users) = directory();
        users.bootstrap_admin("root", "secret").unwrap();
        users.add_user("alice", "pw", Role::User).unwrap();
        assert!(users.user_exists("alice").unwrap());
        assert!(!users.authenticate_admin("alice", "pw").unwrap());
    }

    #[test]
    fn duplicate_username_rejected() {
        let (_dir, users) = directory();
        users.add_user("alice", "pw", Role::User).unwrap();
        assert!(matches!(
            users.add_user("alice", "pw2", Role::Admin),
            Err(GateError::UserExists(_))
        ));
    }

    #[test]
    fn empty_credentials_rejected() {
        let (_dir, users) = directory();
        assert!(matches!(users.bootstrap_admin("", "pw"), Err(GateError::InvalidInput(_))));
        assert!(matches!(users.bootstrap_admin("root", ""), Err(GateError::InvalidInput(_))));
    }

    #[test]
    fn numeric_usernames_are_text() {
        let (_dir, users) = directory();
        users.bootstrap_admin("1234", "pw").unwrap();
        assert!(users.authenticate_admin("1234", "pw").unwrap());
        assert!(users.user_exists("1234").unwrap());
    }
}
