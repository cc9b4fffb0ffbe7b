//! Entity store contract shared by the lifecycle managers.
//!
//! Managers never hold private copies of records: they read through the
//! finders below and write every mutation of one operation through a single
//! [`ChangeSet`] handed to [`PlacementStore::commit`], which the store applies
//! all-or-nothing.

mod csv_file;
mod memory;

pub use self::csv_file::CsvPlacementStore;
pub use self::memory::InMemoryPlacementStore;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, CompanyRepresentative, Internship, InternshipId,
    RepresentativeId, StaffId, StaffMember, Student, StudentId, WithdrawalId, WithdrawalRequest,
};

/// Storage abstraction so the managers can be exercised against any medium.
pub trait PlacementStore: Send + Sync {
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    fn students(&self) -> Result<Vec<Student>, RepositoryError>;

    fn representative(
        &self,
        id: &RepresentativeId,
    ) -> Result<Option<CompanyRepresentative>, RepositoryError>;
    fn representatives(&self) -> Result<Vec<CompanyRepresentative>, RepositoryError>;

    fn staff_member(&self, id: &StaffId) -> Result<Option<StaffMember>, RepositoryError>;
    fn staff(&self) -> Result<Vec<StaffMember>, RepositoryError>;

    fn internship(&self, id: &InternshipId) -> Result<Option<Internship>, RepositoryError>;
    fn internships(&self) -> Result<Vec<Internship>, RepositoryError>;

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;

    fn withdrawal(&self, id: &WithdrawalId) -> Result<Option<WithdrawalRequest>, RepositoryError>;
    fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, RepositoryError>;

    /// Highest identifier suffix ever issued per kind, including suffixes of
    /// records that were later removed.
    fn sequence_marks(&self) -> Result<Vec<SequenceMark>, RepositoryError>;

    /// Apply every change in the batch, or none of them.
    fn commit(&self, changes: ChangeSet) -> Result<(), RepositoryError>;

    fn internships_where(
        &self,
        predicate: &dyn Fn(&Internship) -> bool,
    ) -> Result<Vec<Internship>, RepositoryError> {
        Ok(self
            .internships()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    fn applications_where(
        &self,
        predicate: &dyn Fn(&Application) -> bool,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .applications()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    fn withdrawals_where(
        &self,
        predicate: &dyn Fn(&WithdrawalRequest) -> bool,
    ) -> Result<Vec<WithdrawalRequest>, RepositoryError> {
        Ok(self
            .withdrawals()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("repository io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("repository record encoding failure: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Identifier families whose issued suffixes are tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Internship,
    Application,
    Withdrawal,
}

/// High-water mark of one identifier family. Only ever moves up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMark {
    pub kind: SequenceKind,
    pub last_issued: u64,
}

/// One pending write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Student(Student),
    Representative(CompanyRepresentative),
    Staff(StaffMember),
    Internship(Internship),
    RemoveInternship(InternshipId),
    Application(Application),
    Withdrawal(WithdrawalRequest),
    Sequence(SequenceMark),
}

impl Change {
    fn kind(&self) -> EntityKind {
        match self {
            Change::Student(_) => EntityKind::Student,
            Change::Representative(_) => EntityKind::Representative,
            Change::Staff(_) => EntityKind::Staff,
            Change::Internship(_) | Change::RemoveInternship(_) => EntityKind::Internship,
            Change::Application(_) => EntityKind::Application,
            Change::Withdrawal(_) => EntityKind::Withdrawal,
            Change::Sequence(_) => EntityKind::Sequence,
        }
    }
}

/// Ordered batch of writes produced by one lifecycle operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student(mut self, record: Student) -> Self {
        self.changes.push(Change::Student(record));
        self
    }

    pub fn representative(mut self, record: CompanyRepresentative) -> Self {
        self.changes.push(Change::Representative(record));
        self
    }

    pub fn staff(mut self, record: StaffMember) -> Self {
        self.changes.push(Change::Staff(record));
        self
    }

    pub fn internship(mut self, record: Internship) -> Self {
        self.changes.push(Change::Internship(record));
        self
    }

    pub fn remove_internship(mut self, id: InternshipId) -> Self {
        self.changes.push(Change::RemoveInternship(id));
        self
    }

    pub fn application(mut self, record: Application) -> Self {
        self.changes.push(Change::Application(record));
        self
    }

    pub fn withdrawal(mut self, record: WithdrawalRequest) -> Self {
        self.changes.push(Change::Withdrawal(record));
        self
    }

    /// Record the identifier issued for a new record in the same batch.
    pub fn sequence(mut self, mark: SequenceMark) -> Self {
        self.changes.push(Change::Sequence(mark));
        self
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub(crate) fn touched(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = self.changes.iter().map(Change::kind).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum EntityKind {
    Student,
    Representative,
    Staff,
    Internship,
    Application,
    Withdrawal,
    Sequence,
}

/// Keyed tables backing both store implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityTables {
    pub(crate) students: BTreeMap<StudentId, Student>,
    pub(crate) representatives: BTreeMap<RepresentativeId, CompanyRepresentative>,
    pub(crate) staff: BTreeMap<StaffId, StaffMember>,
    pub(crate) internships: BTreeMap<InternshipId, Internship>,
    pub(crate) applications: BTreeMap<ApplicationId, Application>,
    pub(crate) withdrawals: BTreeMap<WithdrawalId, WithdrawalRequest>,
    pub(crate) sequences: BTreeMap<SequenceKind, SequenceMark>,
}

impl EntityTables {
    pub(crate) fn apply(&mut self, changes: ChangeSet) {
        for change in changes.changes {
            match change {
                Change::Student(record) => {
                    self.students.insert(record.id.clone(), record);
                }
                Change::Representative(record) => {
                    self.representatives.insert(record.id.clone(), record);
                }
                Change::Staff(record) => {
                    self.staff.insert(record.id.clone(), record);
                }
                Change::Internship(record) => {
                    self.internships.insert(record.id.clone(), record);
                }
                Change::RemoveInternship(id) => {
                    self.internships.remove(&id);
                }
                Change::Application(record) => {
                    self.applications.insert(record.id.clone(), record);
                }
                Change::Withdrawal(record) => {
                    self.withdrawals.insert(record.id.clone(), record);
                }
                Change::Sequence(mark) => {
                    let entry = self.sequences.entry(mark.kind).or_insert(mark);
                    entry.last_issued = entry.last_issued.max(mark.last_issued);
                }
            }
        }
    }
}
