use std::sync::{Mutex, MutexGuard};
use tracing::*;

use crate::{
    model::is_blank, storage::RecordStorage, RecordSet, StorageError, StoreError, User,
};

/// Owns the authoritative record set and keeps its storage in step with it.
///
/// Every mutation runs while holding the record set lock and is followed by a
/// full save before the lock is released, so concurrent writers are applied
/// one at a time and the last successful save always holds every applied
/// mutation. A failed save leaves the mutation in memory and reports the
/// error; the next successful save catches storage up.
pub struct RecordStore {
    storage: Box<dyn RecordStorage>,
    users: Mutex<RecordSet>,
}

impl RecordStore {
    pub fn load(storage: Box<dyn RecordStorage>) -> Result<Self, StoreError> {
        let users = storage.load()?;

        info!(users = users.len(), "loaded");

        Ok(Self {
            storage,
            users: Mutex::new(users),
        })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let users = self.lock()?;

        self.persist(&users)
    }

    pub fn list(&self) -> Result<RecordSet, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Every user in username order.
    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .map(|(username, entry)| User::from_entry(username, entry))
            .collect())
    }

    pub fn get(&self, username: &str) -> Result<User, StoreError> {
        self.lock()?
            .get(username)
            .map(|entry| User::from_entry(username, entry))
            .ok_or_else(|| StoreError::NotFound(username.to_owned()))
    }

    pub fn create(&self, user: User) -> Result<User, StoreError> {
        user.validate()?;

        self.mutate(|users| {
            if users.contains_key(&user.username) {
                warn!(username = %user.username, "create:conflict");
                return Err(StoreError::Conflict(user.username));
            }

            info!(username = %user.username, "create");

            let (username, entry) = user.clone().into_parts();
            users.insert(username, entry);

            Ok(user)
        })
    }

    /// Replaces the fields of an existing user. The username is the key and
    /// can't be changed, a blank username in `user` means "keep the key".
    pub fn update(&self, username: &str, mut user: User) -> Result<User, StoreError> {
        if is_blank(&user.username) {
            user.username = username.to_owned();
        }

        self.mutate(|users| {
            if !users.contains_key(username) {
                return Err(StoreError::NotFound(username.to_owned()));
            }

            user.validate_fields()?;

            if user.username != username {
                return Err(StoreError::Rename(username.to_owned(), user.username));
            }

            info!(%username, "update");

            let (username, entry) = user.clone().into_parts();
            users.insert(username, entry);

            Ok(user)
        })
    }

    pub fn delete(&self, username: &str) -> Result<User, StoreError> {
        self.mutate(|users| {
            let entry = users
                .remove(username)
                .ok_or_else(|| StoreError::NotFound(username.to_owned()))?;

            info!(%username, "delete");

            Ok(User::from_entry(username, &entry))
        })
    }

    fn mutate<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut RecordSet) -> Result<T, StoreError>,
    {
        let mut users = self.lock()?;
        let value = operation(&mut users)?;

        self.persist(&users)?;

        Ok(value)
    }

    fn persist(&self, users: &RecordSet) -> Result<(), StoreError> {
        self.storage.save(users).map_err(|e| {
            warn!(error = ?e, "save failed, memory and storage diverge");
            e.into()
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, RecordSet>, StorageError> {
        self.users.lock().map_err(|_| StorageError::Poisoned)
    }
}
