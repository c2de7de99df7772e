//! In-memory storage implementation.
//!
//! All collections sit behind a single `RwLock`. Compound operations take the
//! write guard once, so they are atomic with respect to every other call.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use lingua_core::{
    Instructor, InstructorId, Payment, PaymentCompletion, PaymentId, Program, ProgramId,
    ProgramStatus, Role, SelectedProgram, SelectionId, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::schema::entity;
use crate::Store;

#[derive(Default)]
struct Collections {
    users: BTreeMap<UserId, User>,
    programs: BTreeMap<ProgramId, Program>,
    instructors: BTreeMap<InstructorId, Instructor>,
    selections: BTreeMap<SelectionId, SelectedProgram>,
    payments: BTreeMap<PaymentId, Payment>,
}

/// Process-memory storage implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.inner.read().map_err(|_| StoreError::poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.inner.write().map_err(|_| StoreError::poisoned())
    }
}

impl Store for MemoryStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn insert_user(&self, user: &User) -> Result<()> {
        let mut db = self.write()?;
        if db.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::AlreadyExists {
                entity: entity::USER,
                key: user.email.clone(),
            });
        }
        db.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn set_user_role(&self, id: &UserId, role: Role) -> Result<User> {
        let mut db = self.write()?;
        let user = db
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(entity::USER, id))?;
        user.role = role;
        Ok(user.clone())
    }

    // =========================================================================
    // Program Operations
    // =========================================================================

    fn put_program(&self, program: &Program) -> Result<()> {
        self.write()?
            .programs
            .insert(program.id.clone(), program.clone());
        Ok(())
    }

    fn insert_program_if_absent(&self, program: &Program) -> Result<bool> {
        match self.write()?.programs.entry(program.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(program.clone());
                Ok(true)
            }
        }
    }

    fn get_program(&self, id: &ProgramId) -> Result<Option<Program>> {
        Ok(self.read()?.programs.get(id).cloned())
    }

    fn list_programs(&self) -> Result<Vec<Program>> {
        Ok(self.read()?.programs.values().cloned().collect())
    }

    fn set_program_status(&self, id: &ProgramId, status: ProgramStatus) -> Result<Program> {
        let mut db = self.write()?;
        let program = db
            .programs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(entity::PROGRAM, id))?;
        program.status = status;
        Ok(program.clone())
    }

    fn set_program_feedback(&self, id: &ProgramId, feedback: &str) -> Result<Program> {
        let mut db = self.write()?;
        let program = db
            .programs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(entity::PROGRAM, id))?;
        program.feedback = feedback.to_string();
        Ok(program.clone())
    }

    // =========================================================================
    // Instructor Operations
    // =========================================================================

    fn put_instructor(&self, instructor: &Instructor) -> Result<()> {
        self.write()?
            .instructors
            .insert(instructor.id.clone(), instructor.clone());
        Ok(())
    }

    fn insert_instructor_if_absent(&self, instructor: &Instructor) -> Result<bool> {
        match self.write()?.instructors.entry(instructor.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(instructor.clone());
                Ok(true)
            }
        }
    }

    fn list_instructors(&self) -> Result<Vec<Instructor>> {
        Ok(self.read()?.instructors.values().cloned().collect())
    }

    // =========================================================================
    // Selected Program Operations
    // =========================================================================

    fn insert_selection(&self, selection: &SelectedProgram) -> Result<()> {
        let mut db = self.write()?;
        let taken = db
            .selections
            .values()
            .any(|s| s.email == selection.email && s.program_id == selection.program_id);
        if taken {
            return Err(StoreError::AlreadyExists {
                entity: entity::SELECTION,
                key: format!("{}/{}", selection.email, selection.program_id),
            });
        }
        db.selections
            .insert(selection.id.clone(), selection.clone());
        Ok(())
    }

    fn get_selection(&self, id: &SelectionId) -> Result<Option<SelectedProgram>> {
        Ok(self.read()?.selections.get(id).cloned())
    }

    fn list_selections_by_email(&self, email: &str) -> Result<Vec<SelectedProgram>> {
        Ok(self
            .read()?
            .selections
            .values()
            .filter(|s| s.email == email)
            .cloned()
            .collect())
    }

    fn delete_selection(&self, id: &SelectionId) -> Result<()> {
        self.write()?
            .selections
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(entity::SELECTION, id))
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    fn get_payment(&self, id: &PaymentId) -> Result<Option<Payment>> {
        Ok(self.read()?.payments.get(id).cloned())
    }

    fn list_payments_by_email(&self, email: &str) -> Result<Vec<Payment>> {
        Ok(self
            .read()?
            .payments
            .values()
            .rev()
            .filter(|p| p.email == email)
            .cloned()
            .collect())
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn complete_payment(&self, completion: &PaymentCompletion) -> Result<Program> {
        let mut db = self.write()?;
        let payment = &completion.payment;

        let selection = db.selections.get(&completion.selection_id).ok_or_else(|| {
            StoreError::StaleSelection {
                selection_id: completion.selection_id.to_string(),
            }
        })?;

        if selection.email != payment.email || selection.program_id != payment.program_id {
            return Err(StoreError::SelectionMismatch {
                selection_id: completion.selection_id.to_string(),
            });
        }

        // Validate everything before the first mutation.
        let program = db
            .programs
            .get_mut(&payment.program_id)
            .ok_or_else(|| StoreError::not_found(entity::PROGRAM, &payment.program_id))?;

        program.enrolled += 1;
        let updated = program.clone();

        db.selections.remove(&completion.selection_id);
        db.payments.insert(payment.id.clone(), payment.clone());

        tracing::debug!(
            program_id = %updated.id,
            payment_id = %payment.id,
            enrolled = updated.enrolled,
            "Payment committed"
        );

        Ok(updated)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::NewProgram;

    fn program(store: &MemoryStore, instructor_email: &str) -> Program {
        let program = Program::submit(NewProgram {
            name: "French for Travellers".into(),
            image: None,
            instructor_name: "Claire".into(),
            instructor_email: instructor_email.into(),
            available_seats: 15,
            price: 50.0,
        });
        store.put_program(&program).unwrap();
        program
    }

    #[test]
    fn user_email_is_unique() {
        let store = MemoryStore::new();
        store.insert_user(&User::new("a@x.com", None, None)).unwrap();

        let result = store.insert_user(&User::new("a@x.com", None, None));
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn role_update() {
        let store = MemoryStore::new();
        let user = User::new("a@x.com", None, None);
        store.insert_user(&user).unwrap();

        let updated = store.set_user_role(&user.id, Role::Instructor).unwrap();
        assert_eq!(updated.role, Role::Instructor);

        let missing = store.set_user_role(&UserId::generate(), Role::Admin);
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn duplicate_selection_rejected() {
        let store = MemoryStore::new();
        let p = program(&store, "t@x.com");

        store
            .insert_selection(&SelectedProgram::new("a@x.com", p.id.clone()))
            .unwrap();
        let result = store.insert_selection(&SelectedProgram::new("a@x.com", p.id.clone()));

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(store.list_selections_by_email("a@x.com").unwrap().len(), 1);

        // A different student may select the same program.
        store
            .insert_selection(&SelectedProgram::new("b@x.com", p.id))
            .unwrap();
    }

    #[test]
    fn complete_payment_applies_all_steps() {
        let store = MemoryStore::new();
        let p = program(&store, "t@x.com");
        let selection = SelectedProgram::new("a@x.com", p.id.clone());
        store.insert_selection(&selection).unwrap();

        let completion =
            PaymentCompletion::new(selection.id.clone(), "a@x.com", p.id.clone(), 5000, None);
        let updated = store.complete_payment(&completion).unwrap();

        assert_eq!(updated.enrolled, 1);
        assert_eq!(store.get_program(&p.id).unwrap().unwrap().enrolled, 1);
        assert!(store.get_selection(&selection.id).unwrap().is_none());
        assert_eq!(store.list_payments_by_email("a@x.com").unwrap().len(), 1);
    }

    #[test]
    fn duplicate_completion_does_not_double_increment() {
        let store = MemoryStore::new();
        let p = program(&store, "t@x.com");
        let selection = SelectedProgram::new("a@x.com", p.id.clone());
        store.insert_selection(&selection).unwrap();

        let first =
            PaymentCompletion::new(selection.id.clone(), "a@x.com", p.id.clone(), 5000, None);
        let second =
            PaymentCompletion::new(selection.id.clone(), "a@x.com", p.id.clone(), 5000, None);

        store.complete_payment(&first).unwrap();
        let result = store.complete_payment(&second);

        assert!(matches!(result, Err(StoreError::StaleSelection { .. })));
        assert_eq!(store.get_program(&p.id).unwrap().unwrap().enrolled, 1);
        assert_eq!(store.list_payments_by_email("a@x.com").unwrap().len(), 1);
    }

    #[test]
    fn concurrent_completions_settle_once() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let p = program(&store, "t@x.com");
        let selection = SelectedProgram::new("a@x.com", p.id.clone());
        store.insert_selection(&selection).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let completion = PaymentCompletion::new(
                    selection.id.clone(),
                    "a@x.com",
                    p.id.clone(),
                    5000,
                    None,
                );
                std::thread::spawn(move || store.complete_payment(&completion).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.get_program(&p.id).unwrap().unwrap().enrolled, 1);
    }

    #[test]
    fn mismatched_selection_writes_nothing() {
        let store = MemoryStore::new();
        let p = program(&store, "t@x.com");
        let selection = SelectedProgram::new("a@x.com", p.id.clone());
        store.insert_selection(&selection).unwrap();

        let completion =
            PaymentCompletion::new(selection.id.clone(), "b@x.com", p.id.clone(), 5000, None);
        let result = store.complete_payment(&completion);

        assert!(matches!(result, Err(StoreError::SelectionMismatch { .. })));
        assert_eq!(store.get_program(&p.id).unwrap().unwrap().enrolled, 0);
        assert!(store.get_selection(&selection.id).unwrap().is_some());
    }

    #[test]
    fn missing_program_writes_nothing() {
        let store = MemoryStore::new();
        let ghost: ProgramId = "gone".parse().unwrap();
        let selection = SelectedProgram::new("a@x.com", ghost.clone());
        store.insert_selection(&selection).unwrap();

        let completion = PaymentCompletion::new(selection.id.clone(), "a@x.com", ghost, 5000, None);
        let result = store.complete_payment(&completion);

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.get_selection(&selection.id).unwrap().is_some());
        assert!(store.list_payments_by_email("a@x.com").unwrap().is_empty());
    }

    #[test]
    fn payment_join_tolerates_missing_program() {
        let store = MemoryStore::new();
        let p = program(&store, "t@x.com");
        let selection = SelectedProgram::new("a@x.com", p.id.clone());
        store.insert_selection(&selection).unwrap();
        store
            .complete_payment(&PaymentCompletion::new(
                selection.id,
                "a@x.com",
                p.id.clone(),
                5000,
                None,
            ))
            .unwrap();

        // Orphan payment: its program is not in the store.
        let orphan = PaymentCompletion::new(
            SelectionId::generate(),
            "a@x.com",
            "deleted".parse().unwrap(),
            100,
            None,
        )
        .payment;
        store.write().unwrap().payments.insert(orphan.id.clone(), orphan);

        let joined = store.list_payments_with_programs("a@x.com").unwrap();
        assert_eq!(joined.len(), 2);
        assert!(joined[0].program.is_none());
        assert_eq!(joined[1].program.as_ref().unwrap().id, p.id);
    }

    #[test]
    fn programs_by_instructor() {
        let store = MemoryStore::new();
        program(&store, "t@x.com");
        program(&store, "t@x.com");
        program(&store, "u@x.com");

        assert_eq!(store.list_programs_by_instructor("t@x.com").unwrap().len(), 2);
        assert!(store.list_programs_by_instructor("v@x.com").unwrap().is_empty());
    }

    #[test]
    fn back_to_back_payments_listed_newest_first() {
        let store = MemoryStore::new();
        for _ in 0..200 {
            let first = program(&store, "t@x.com");
            let second = program(&store, "t@x.com");
            for p in [&first, &second] {
                let selection = SelectedProgram::new("a@x.com", p.id.clone());
                store.insert_selection(&selection).unwrap();
                store
                    .complete_payment(&PaymentCompletion::new(
                        selection.id,
                        "a@x.com",
                        p.id.clone(),
                        100,
                        None,
                    ))
                    .unwrap();
            }

            let history = store.list_payments_by_email("a@x.com").unwrap();
            assert_eq!(history[0].program_id, second.id);
            assert_eq!(history[1].program_id, first.id);
        }
    }

    #[test]
    fn insert_if_absent_keeps_stored_documents() {
        let store = MemoryStore::new();
        let p = program(&store, "t@x.com");
        let selection = SelectedProgram::new("a@x.com", p.id.clone());
        store.insert_selection(&selection).unwrap();
        store
            .complete_payment(&PaymentCompletion::new(
                selection.id,
                "a@x.com",
                p.id.clone(),
                100,
                None,
            ))
            .unwrap();

        assert!(!store.insert_program_if_absent(&p).unwrap());
        assert_eq!(store.get_program(&p.id).unwrap().unwrap().enrolled, 1);

        let fresh = Program::submit(NewProgram {
            name: "Italian".into(),
            image: None,
            instructor_name: "Luca".into(),
            instructor_email: "luca@x.com".into(),
            available_seats: 5,
            price: 30.0,
        });
        assert!(store.insert_program_if_absent(&fresh).unwrap());
        assert_eq!(store.list_programs().unwrap().len(), 2);
    }
}
