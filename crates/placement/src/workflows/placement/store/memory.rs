use std::sync::{Arc, Mutex, MutexGuard};

use super::{ChangeSet, EntityTables, PlacementStore, RepositoryError, SequenceMark};
use crate::workflows::placement::domain::{
    Application, ApplicationId, CompanyRepresentative, Internship, InternshipId,
    RepresentativeId, StaffId, StaffMember, Student, StudentId, WithdrawalId, WithdrawalRequest,
};

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPlacementStore {
    tables: Arc<Mutex<EntityTables>>,
}

impl InMemoryPlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, EntityTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl PlacementStore for InMemoryPlacementStore {
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        Ok(self.tables()?.students.get(id).cloned())
    }

    fn students(&self) -> Result<Vec<Student>, RepositoryError> {
        Ok(self.tables()?.students.values().cloned().collect())
    }

    fn representative(
        &self,
        id: &RepresentativeId,
    ) -> Result<Option<CompanyRepresentative>, RepositoryError> {
        Ok(self.tables()?.representatives.get(id).cloned())
    }

    fn representatives(&self) -> Result<Vec<CompanyRepresentative>, RepositoryError> {
        Ok(self.tables()?.representatives.values().cloned().collect())
    }

    fn staff_member(&self, id: &StaffId) -> Result<Option<StaffMember>, RepositoryError> {
        Ok(self.tables()?.staff.get(id).cloned())
    }

    fn staff(&self) -> Result<Vec<StaffMember>, RepositoryError> {
        Ok(self.tables()?.staff.values().cloned().collect())
    }

    fn internship(&self, id: &InternshipId) -> Result<Option<Internship>, RepositoryError> {
        Ok(self.tables()?.internships.get(id).cloned())
    }

    fn internships(&self) -> Result<Vec<Internship>, RepositoryError> {
        Ok(self.tables()?.internships.values().cloned().collect())
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.tables()?.applications.get(id).cloned())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.tables()?.applications.values().cloned().collect())
    }

    fn withdrawal(&self, id: &WithdrawalId) -> Result<Option<WithdrawalRequest>, RepositoryError> {
        Ok(self.tables()?.withdrawals.get(id).cloned())
    }

    fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, RepositoryError> {
        Ok(self.tables()?.withdrawals.values().cloned().collect())
    }

    fn sequence_marks(&self) -> Result<Vec<SequenceMark>, RepositoryError> {
        Ok(self.tables()?.sequences.values().copied().collect())
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), RepositoryError> {
        self.tables()?.apply(changes);
        Ok(())
    }
}
