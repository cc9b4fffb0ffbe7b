use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::{
    ChangeSet, EntityKind, EntityTables, PlacementStore, RepositoryError, SequenceMark,
};
use crate::workflows::placement::domain::{
    Application, ApplicationId, CompanyRepresentative, Internship, InternshipId,
    RepresentativeId, StaffId, StaffMember, Student, StudentId, WithdrawalId, WithdrawalRequest,
};

const STUDENTS_FILE: &str = "students.csv";
const REPRESENTATIVES_FILE: &str = "representatives.csv";
const STAFF_FILE: &str = "staff.csv";
const INTERNSHIPS_FILE: &str = "internships.csv";
const APPLICATIONS_FILE: &str = "applications.csv";
const WITHDRAWALS_FILE: &str = "withdrawals.csv";
const SEQUENCES_FILE: &str = "sequences.csv";

/// File-backed store keeping one CSV file per entity kind.
///
/// Records are loaded once on [`CsvPlacementStore::open`]. Each commit
/// rewrites the files of the kinds it touched (temp file, then rename) and
/// only then swaps the in-memory view, so readers never observe a batch that
/// failed to persist.
#[derive(Debug)]
pub struct CsvPlacementStore {
    dir: PathBuf,
    tables: RwLock<EntityTables>,
}

impl CsvPlacementStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let tables = EntityTables {
            students: load_table(&dir.join(STUDENTS_FILE), |record: &Student| {
                record.id.clone()
            })?,
            representatives: load_table(
                &dir.join(REPRESENTATIVES_FILE),
                |record: &CompanyRepresentative| record.id.clone(),
            )?,
            staff: load_table(&dir.join(STAFF_FILE), |record: &StaffMember| {
                record.id.clone()
            })?,
            internships: load_table(&dir.join(INTERNSHIPS_FILE), |record: &Internship| {
                record.id.clone()
            })?,
            applications: load_table(&dir.join(APPLICATIONS_FILE), |record: &Application| {
                record.id.clone()
            })?,
            withdrawals: load_table(
                &dir.join(WITHDRAWALS_FILE),
                |record: &WithdrawalRequest| record.id.clone(),
            )?,
            sequences: load_table(&dir.join(SEQUENCES_FILE), |mark: &SequenceMark| mark.kind)?,
        };

        info!(
            dir = %dir.display(),
            students = tables.students.len(),
            internships = tables.internships.len(),
            applications = tables.applications.len(),
            withdrawals = tables.withdrawals.len(),
            "loaded placement records"
        );

        Ok(Self {
            dir,
            tables: RwLock::new(tables),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn tables(&self) -> Result<RwLockReadGuard<'_, EntityTables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    fn persist(&self, tables: &EntityTables, kind: EntityKind) -> Result<(), RepositoryError> {
        match kind {
            EntityKind::Student => {
                write_table(&self.dir.join(STUDENTS_FILE), tables.students.values())
            }
            EntityKind::Representative => write_table(
                &self.dir.join(REPRESENTATIVES_FILE),
                tables.representatives.values(),
            ),
            EntityKind::Staff => write_table(&self.dir.join(STAFF_FILE), tables.staff.values()),
            EntityKind::Internship => {
                write_table(&self.dir.join(INTERNSHIPS_FILE), tables.internships.values())
            }
            EntityKind::Application => write_table(
                &self.dir.join(APPLICATIONS_FILE),
                tables.applications.values(),
            ),
            EntityKind::Withdrawal => {
                write_table(&self.dir.join(WITHDRAWALS_FILE), tables.withdrawals.values())
            }
            EntityKind::Sequence => {
                write_table(&self.dir.join(SEQUENCES_FILE), tables.sequences.values())
            }
        }
    }
}

impl PlacementStore for CsvPlacementStore {
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
        let mut guard = self
            .tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;

        let touched = changes.touched();
        let count = changes.len();
        let mut next = guard.clone();
        next.apply(changes);

        for kind in touched {
            self.persist(&next, kind)?;
        }

        *guard = next;
        debug!(changes = count, dir = %self.dir.display(), "committed placement changes");
        Ok(())
    }
}

fn load_table<K, T>(
    path: &Path,
    key: impl Fn(&T) -> K,
) -> Result<BTreeMap<K, T>, RepositoryError>
where
    K: Ord,
    T: DeserializeOwned,
{
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let mut reader = ::csv::ReaderBuilder::new().from_path(path)?;
    let mut records = BTreeMap::new();
    for row in reader.deserialize::<T>() {
        let record = row?;
        records.insert(key(&record), record);
    }

    Ok(records)
}

fn write_table<'a, T>(
    path: &Path,
    records: impl Iterator<Item = &'a T>,
) -> Result<(), RepositoryError>
where
    T: Serialize + 'a,
{
    let staging = path.with_extension("csv.tmp");
    {
        let mut writer = ::csv::Writer::from_path(&staging)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    fs::rename(&staging, path)?;
    Ok(())
}
