//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! Read-check-write operations hold `write_lock` for their whole duration and
//! commit through one `WriteBatch`.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use lingua_core::{
    Instructor, Payment, PaymentCompletion, PaymentId, Program, ProgramId, ProgramStatus, Role,
    SelectedProgram, SelectionId, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf, entity};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::poisoned())
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_doc<T: serde::de::DeserializeOwned>(&self, cf_name: &str, id: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, keys::document_key(id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_doc<T: serde::Serialize>(&self, cf_name: &str, id: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = Self::serialize(value)?;
        self.db
            .put_cf(&cf, keys::document_key(id), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn scan<T: serde::de::DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                Self::deserialize(&value)
            })
            .collect()
    }

    /// Item ids of every index entry under `owner`, in key order.
    fn index_items(&self, cf_name: &str, owner: &str) -> Result<Vec<String>> {
        let cf = self.cf(cf_name)?;
        let prefix = keys::index_prefix(owner);
        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut items = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            if let Some(id) = keys::index_item(&key) {
                items.push(id.to_string());
            }
        }
        Ok(items)
    }

    fn has_key(&self, cf_name: &str, key: &[u8]) -> Result<bool> {
        let cf = self.cf(cf_name)?;
        Ok(self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some())
    }

    fn update_program<F: FnOnce(&mut Program)>(&self, id: &ProgramId, f: F) -> Result<Program> {
        let _guard = self.lock()?;
        let mut program: Program = self
            .get_doc(cf::PROGRAMS, id.as_str())?
            .ok_or_else(|| StoreError::not_found(entity::PROGRAM, id))?;
        f(&mut program);
        self.put_doc(cf::PROGRAMS, id.as_str(), &program)?;
        Ok(program)
    }

    /// Queue removal of a selection and its index entries.
    fn batch_delete_selection(
        &self,
        batch: &mut WriteBatch,
        selection: &SelectedProgram,
    ) -> Result<()> {
        let cf_sel = self.cf(cf::SELECTED_PROGRAMS)?;
        let cf_by_email = self.cf(cf::SELECTED_PROGRAMS_BY_EMAIL)?;
        let cf_by_pair = self.cf(cf::SELECTED_PROGRAMS_BY_PAIR)?;

        batch.delete_cf(&cf_sel, keys::document_key(selection.id.as_str()));
        batch.delete_cf(
            &cf_by_email,
            keys::index_key(&selection.email, selection.id.as_str()),
        );
        batch.delete_cf(
            &cf_by_pair,
            keys::selection_pair_key(&selection.email, selection.program_id.as_str()),
        );
        Ok(())
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn insert_user(&self, user: &User) -> Result<()> {
        let _guard = self.lock()?;
        if self.has_key(cf::USERS_BY_EMAIL, user.email.as_bytes())? {
            return Err(StoreError::AlreadyExists {
                entity: entity::USER,
                key: user.email.clone(),
            });
        }

        let cf_users = self.cf(cf::USERS)?;
        let cf_by_email = self.cf(cf::USERS_BY_EMAIL)?;
        let value = Self::serialize(user)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_users, keys::document_key(user.id.as_str()), &value);
        batch.put_cf(&cf_by_email, user.email.as_bytes(), user.id.as_bytes());
        self.write(batch)
    }

    fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.get_doc(cf::USERS, id.as_str())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let cf = self.cf(cf::USERS_BY_EMAIL)?;
        let Some(id) = self
            .db
            .get_cf(&cf, email.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };
        let id = String::from_utf8(id).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.get_doc(cf::USERS, &id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.scan(cf::USERS)
    }

    fn set_user_role(&self, id: &UserId, role: Role) -> Result<User> {
        let _guard = self.lock()?;
        let mut user: User = self
            .get_doc(cf::USERS, id.as_str())?
            .ok_or_else(|| StoreError::not_found(entity::USER, id))?;
        user.role = role;
        self.put_doc(cf::USERS, id.as_str(), &user)?;
        Ok(user)
    }

    // =========================================================================
    // Program Operations
    // =========================================================================

    fn put_program(&self, program: &Program) -> Result<()> {
        let _guard = self.lock()?;
        self.put_doc(cf::PROGRAMS, program.id.as_str(), program)
    }

    fn insert_program_if_absent(&self, program: &Program) -> Result<bool> {
        let _guard = self.lock()?;
        if self.has_key(cf::PROGRAMS, &keys::document_key(program.id.as_str()))? {
            return Ok(false);
        }
        self.put_doc(cf::PROGRAMS, program.id.as_str(), program)?;
        Ok(true)
    }

    fn get_program(&self, id: &ProgramId) -> Result<Option<Program>> {
        self.get_doc(cf::PROGRAMS, id.as_str())
    }

    fn list_programs(&self) -> Result<Vec<Program>> {
        self.scan(cf::PROGRAMS)
    }

    fn set_program_status(&self, id: &ProgramId, status: ProgramStatus) -> Result<Program> {
        self.update_program(id, |p| p.status = status)
    }

    fn set_program_feedback(&self, id: &ProgramId, feedback: &str) -> Result<Program> {
        self.update_program(id, |p| p.feedback = feedback.to_string())
    }

    // =========================================================================
    // Instructor Operations
    // =========================================================================

    fn put_instructor(&self, instructor: &Instructor) -> Result<()> {
        self.put_doc(cf::INSTRUCTORS, instructor.id.as_str(), instructor)
    }

    fn insert_instructor_if_absent(&self, instructor: &Instructor) -> Result<bool> {
        let _guard = self.lock()?;
        if self.has_key(cf::INSTRUCTORS, &keys::document_key(instructor.id.as_str()))? {
            return Ok(false);
        }
        self.put_doc(cf::INSTRUCTORS, instructor.id.as_str(), instructor)?;
        Ok(true)
    }

    fn list_instructors(&self) -> Result<Vec<Instructor>> {
        self.scan(cf::INSTRUCTORS)
    }

    // =========================================================================
    // Selected Program Operations
    // =========================================================================

    fn insert_selection(&self, selection: &SelectedProgram) -> Result<()> {
        let _guard = self.lock()?;
        let pair_key = keys::selection_pair_key(&selection.email, selection.program_id.as_str());
        if self.has_key(cf::SELECTED_PROGRAMS_BY_PAIR, &pair_key)? {
            return Err(StoreError::AlreadyExists {
                entity: entity::SELECTION,
                key: format!("{}/{}", selection.email, selection.program_id),
            });
        }

        let cf_sel = self.cf(cf::SELECTED_PROGRAMS)?;
        let cf_by_email = self.cf(cf::SELECTED_PROGRAMS_BY_EMAIL)?;
        let cf_by_pair = self.cf(cf::SELECTED_PROGRAMS_BY_PAIR)?;
        let value = Self::serialize(selection)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_sel, keys::document_key(selection.id.as_str()), &value);
        batch.put_cf(
            &cf_by_email,
            keys::index_key(&selection.email, selection.id.as_str()),
            [],
        );
        batch.put_cf(&cf_by_pair, &pair_key, selection.id.as_bytes());
        self.write(batch)
    }

    fn get_selection(&self, id: &SelectionId) -> Result<Option<SelectedProgram>> {
        self.get_doc(cf::SELECTED_PROGRAMS, id.as_str())
    }

    fn list_selections_by_email(&self, email: &str) -> Result<Vec<SelectedProgram>> {
        let mut selections = Vec::new();
        for id in self.index_items(cf::SELECTED_PROGRAMS_BY_EMAIL, email)? {
            if let Some(selection) = self.get_doc(cf::SELECTED_PROGRAMS, &id)? {
                selections.push(selection);
            }
        }
        Ok(selections)
    }

    fn delete_selection(&self, id: &SelectionId) -> Result<()> {
        let _guard = self.lock()?;
        let selection: SelectedProgram = self
            .get_doc(cf::SELECTED_PROGRAMS, id.as_str())?
            .ok_or_else(|| StoreError::not_found(entity::SELECTION, id))?;

        let mut batch = WriteBatch::default();
        self.batch_delete_selection(&mut batch, &selection)?;
        self.write(batch)
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    fn get_payment(&self, id: &PaymentId) -> Result<Option<Payment>> {
        self.get_doc(cf::PAYMENTS, id.as_str())
    }

    fn list_payments_by_email(&self, email: &str) -> Result<Vec<Payment>> {
        let mut ids = self.index_items(cf::PAYMENTS_BY_EMAIL, email)?;
        // ULIDs are time-ordered; reverse for newest first.
        ids.reverse();

        let mut payments = Vec::new();
        for id in ids {
            if let Some(payment) = self.get_doc(cf::PAYMENTS, &id)? {
                payments.push(payment);
            }
        }
        Ok(payments)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn complete_payment(&self, completion: &PaymentCompletion) -> Result<Program> {
        let _guard = self.lock()?;
        let payment = &completion.payment;

        let selection: SelectedProgram = self
            .get_doc(cf::SELECTED_PROGRAMS, completion.selection_id.as_str())?
            .ok_or_else(|| StoreError::StaleSelection {
                selection_id: completion.selection_id.to_string(),
            })?;

        if selection.email != payment.email || selection.program_id != payment.program_id {
            return Err(StoreError::SelectionMismatch {
                selection_id: completion.selection_id.to_string(),
            });
        }

        let mut program: Program = self
            .get_doc(cf::PROGRAMS, payment.program_id.as_str())?
            .ok_or_else(|| StoreError::not_found(entity::PROGRAM, &payment.program_id))?;
        program.enrolled += 1;

        let cf_programs = self.cf(cf::PROGRAMS)?;
        let cf_payments = self.cf(cf::PAYMENTS)?;
        let cf_payments_by_email = self.cf(cf::PAYMENTS_BY_EMAIL)?;

        let program_value = Self::serialize(&program)?;
        let payment_value = Self::serialize(payment)?;

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_programs,
            keys::document_key(program.id.as_str()),
            &program_value,
        );
        self.batch_delete_selection(&mut batch, &selection)?;
        batch.put_cf(
            &cf_payments,
            keys::document_key(payment.id.as_str()),
            &payment_value,
        );
        batch.put_cf(
            &cf_payments_by_email,
            keys::index_key(&payment.email, payment.id.as_str()),
            [],
        );
        self.write(batch)?;

        tracing::debug!(
            program_id = %program.id,
            payment_id = %payment.id,
            enrolled = program.enrolled,
            "Payment committed"
        );

        Ok(program)
    }

    fn close(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
