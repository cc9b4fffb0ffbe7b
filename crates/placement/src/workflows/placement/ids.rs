use std::sync::atomic::{AtomicU64, Ordering};

use super::domain::{ApplicationId, InternshipId, WithdrawalId};
use super::store::{PlacementStore, RepositoryError, SequenceKind, SequenceMark};

const INTERNSHIP_PREFIX: &str = "int";
const APPLICATION_PREFIX: &str = "app";
const WITHDRAWAL_PREFIX: &str = "wdr";

/// Per-kind monotonic identifier source.
///
/// Identifiers are never reused: a sequence opened over an existing store
/// starts past both the persisted high-water mark and the highest suffix
/// still present for each kind. Every issued id comes with the mark the
/// caller commits alongside the new record.
#[derive(Debug)]
pub struct IdSequence {
    internship: AtomicU64,
    application: AtomicU64,
    withdrawal: AtomicU64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1, 1, 1)
    }
}

impl IdSequence {
    fn starting_at(internship: u64, application: u64, withdrawal: u64) -> Self {
        Self {
            internship: AtomicU64::new(internship),
            application: AtomicU64::new(application),
            withdrawal: AtomicU64::new(withdrawal),
        }
    }

    pub fn seeded_from<S>(store: &S) -> Result<Self, RepositoryError>
    where
        S: PlacementStore + ?Sized,
    {
        let marks = store.sequence_marks()?;
        let marked = |kind: SequenceKind| {
            marks
                .iter()
                .filter(|mark| mark.kind == kind)
                .map(|mark| mark.last_issued)
                .max()
                .unwrap_or(0)
        };

        let internship = highest(
            INTERNSHIP_PREFIX,
            store.internships()?.iter().map(|record| record.id.as_str()),
        )
        .max(marked(SequenceKind::Internship));
        let application = highest(
            APPLICATION_PREFIX,
            store.applications()?.iter().map(|record| record.id.as_str()),
        )
        .max(marked(SequenceKind::Application));
        let withdrawal = highest(
            WITHDRAWAL_PREFIX,
            store.withdrawals()?.iter().map(|record| record.id.as_str()),
        )
        .max(marked(SequenceKind::Withdrawal));

        Ok(Self::starting_at(
            internship.saturating_add(1),
            application.saturating_add(1),
            withdrawal.saturating_add(1),
        ))
    }

    pub fn next_internship(&self) -> (InternshipId, SequenceMark) {
        let (id, mark) = issue(SequenceKind::Internship, INTERNSHIP_PREFIX, &self.internship);
        (InternshipId(id), mark)
    }

    pub fn next_application(&self) -> (ApplicationId, SequenceMark) {
        let (id, mark) = issue(SequenceKind::Application, APPLICATION_PREFIX, &self.application);
        (ApplicationId(id), mark)
    }

    pub fn next_withdrawal(&self) -> (WithdrawalId, SequenceMark) {
        let (id, mark) = issue(SequenceKind::Withdrawal, WITHDRAWAL_PREFIX, &self.withdrawal);
        (WithdrawalId(id), mark)
    }
}

fn issue(kind: SequenceKind, prefix: &str, counter: &AtomicU64) -> (String, SequenceMark) {
    let value = counter.fetch_add(1, Ordering::Relaxed);
    let mark = SequenceMark {
        kind,
        last_issued: value,
    };
    (format!("{prefix}-{value:06}"), mark)
}

fn highest<'a>(prefix: &str, ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| suffix(prefix, id)).max().unwrap_or(0)
}

fn suffix(prefix: &str, id: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.strip_prefix('-')?.parse().ok()
}
