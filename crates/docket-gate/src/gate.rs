use std::fmt;

use tracing::warn;

use docket_store::{Collection, Database};
use docket_types::{
    coerce, CollectionsResponse, CreateManyResponse, CreateResponse, DeleteResponse, Fields,
    Query, ReadResponse, UpdateResponse,
};

use crate::error::{GateError, GateResult};
use crate::users::{Role, UserDirectory, USERS_COLLECTION};

/// Username/password pair presented for a privileged operation.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Policy layer between adapters and the store.
///
/// The gate is the only path adapters use to reach documents. Inbound
/// literals (query values, update values) are coerced here, so every adapter
/// stores and matches values the same way.
#[derive(Clone, Debug)]
pub struct AccessGate {
    db: Database,
    users: UserDirectory,
}

impl AccessGate {
    pub fn new(db: Database) -> Self {
        let users = UserDirectory::new(db.clone());
        Self { db, users }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The user directory.
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Returns `true` for collection names reachable only through the
    /// user directory.
    pub fn is_reserved(name: &str) -> bool {
        name == USERS_COLLECTION
    }

    /// Resolve a collection for generic document access.
    ///
    /// Reserved names are `Forbidden` whether or not they exist; unknown
    /// names are `NotFound`.
    fn open(&self, collection: &str) -> GateResult<Collection> {
        if Self::is_reserved(collection) {
            warn!(collection, "generic access to reserved collection denied");
            return Err(GateError::Forbidden(format!(
                "not authorized to access '{collection}'"
            )));
        }
        Ok(self.db.collection(collection)?)
    }

    fn require_admin(&self, admin: &AdminCredentials, action: &str) -> GateResult<()> {
        if self.users.authenticate_admin(&admin.username, &admin.password)? {
            return Ok(());
        }
        warn!(username = %admin.username, action, "admin authentication failed");
        Err(GateError::Forbidden(format!(
            "admin authentication required to {action}"
        )))
    }

    // ---- Generic document operations ----

    /// Insert one document.
    pub fn create(&self, collection: &str, fields: Fields) -> GateResult<CreateResponse> {
        let id = self.open(collection)?.create(fields)?;
        Ok(CreateResponse { id })
    }

    /// Insert several documents in one write.
    pub fn create_many(
        &self,
        collection: &str,
        batch: Vec<Fields>,
    ) -> GateResult<CreateManyResponse> {
        let ids = self.open(collection)?.create_many(batch)?;
        Ok(CreateManyResponse { ids })
    }

    /// Read documents where `field == coerce(value)`.
    pub fn read(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        return_all: bool,
    ) -> GateResult<ReadResponse> {
        let response = self
            .open(collection)?
            .read(&Query::parse(field, value), return_all)?;
        Ok(ReadResponse { response })
    }

    /// Set `update_field = coerce(update_value)` where `field == coerce(value)`.
    pub fn update(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        update_field: &str,
        update_value: &str,
    ) -> GateResult<UpdateResponse> {
        let updated_doc_ids = self.open(collection)?.update(
            &Query::parse(field, value),
            update_field,
            coerce(update_value),
        )?;
        Ok(UpdateResponse { updated_doc_ids })
    }

    /// Delete documents where `field == coerce(value)`.
    pub fn delete(&self, collection: &str, field: &str, value: &str) -> GateResult<DeleteResponse> {
        let deleted_doc_ids = self.open(collection)?.delete(&Query::parse(field, value))?;
        Ok(DeleteResponse { deleted_doc_ids })
    }

    // ---- Collection lifecycle ----

    /// Names of all materialized collections.
    pub fn list_collections(&self) -> GateResult<CollectionsResponse> {
        let collections = self.db.list()?.into_iter().collect();
        Ok(CollectionsResponse { collections })
    }

    /// Materialize an empty collection. The reserved name is created only by
    /// the user directory.
    pub fn create_collection(&self, name: &str) -> GateResult<()> {
        if Self::is_reserved(name) {
            return Err(GateError::Forbidden(format!(
                "'{name}' is managed by the user directory"
            )));
        }
        Ok(self.db.materialize(name)?)
    }

    /// Destroy a collection and its documents. Requires admin credentials.
    pub fn delete_collection(&self, admin: &AdminCredentials, name: &str) -> GateResult<()> {
        self.require_admin(admin, "delete a collection")?;
        Ok(self.db.destroy(name)?)
    }

    // ---- Users ----

    /// Check admin credentials.
    pub fn authenticate_admin(&self, admin: &AdminCredentials) -> GateResult<bool> {
        self.users.authenticate_admin(&admin.username, &admin.password)
    }

    /// Create the first admin. Fails with `Forbidden` once any admin exists.
    pub fn bootstrap_admin(&self, username: &str, password: &str) -> GateResult<CreateResponse> {
        let id = self.users.bootstrap_admin(username, password)?;
        Ok(CreateResponse { id })
    }

    /// Create a user. Requires admin credentials.
    pub fn create_user(
        &self,
        admin: &AdminCredentials,
        username: &str,
        password: &str,
        role: Role,
    ) -> GateResult<CreateResponse> {
        self.require_admin(admin, "create a user")?;
        let id = self.users.add_user(username, password, role)?;
        Ok(CreateResponse { id })
    }
}
