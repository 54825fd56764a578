//! Notification window classification and at-most-once emission.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::{HolidayCatalog, HolidayRecord, NotifiedKey};

/// Where a holiday falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Today,
    Tomorrow,
    /// Two or more days ahead, up to the configured horizon.
    WithinWeek { days: i64 },
}

/// Severity class carried with each notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NotificationKind {
    Today,
    Tomorrow,
    WithinWeek { days: i64 },
    /// Cycle-level problem, e.g. nothing could be fetched.
    Warning,
}

impl From<Window> for NotificationKind {
    fn from(window: Window) -> Self {
        match window {
            Window::Today => Self::Today,
            Window::Tomorrow => Self::Tomorrow,
            Window::WithinWeek { days } => Self::WithinWeek { days },
        }
    }
}

/// A (title, message, severity) event for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn for_holiday(record: &HolidayRecord, window: Window) -> Self {
        let (title, message) = match window {
            Window::Today => (
                "Holiday Today!".to_string(),
                format!("{}\n{}", record.name, record.day_of_week),
            ),
            Window::Tomorrow => (
                "Holiday Tomorrow!".to_string(),
                format!("{}\n{}", record.name, record.day_of_week),
            ),
            Window::WithinWeek { days } => (
                format!("Upcoming Holiday in {days} days"),
                format!(
                    "{}\n{} ({})",
                    record.name,
                    record.date.format("%Y-%m-%d"),
                    record.day_of_week
                ),
            ),
        };
        Self {
            title,
            message,
            kind: window.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            title: "Warning".to_string(),
            message: message.into(),
            kind: NotificationKind::Warning,
        }
    }
}

/// The set of holidays already announced.
///
/// Implementations decide how (and whether) the set is persisted; the policy
/// only needs membership, insertion, and date-based pruning.
pub trait NotifiedLedger {
    fn contains(&self, key: &NotifiedKey) -> bool;

    /// Insert `key`. Inserting a key that is already present does nothing.
    fn add(&mut self, key: NotifiedKey);

    /// Drop keys dated strictly before `today - retention_days`.
    /// Returns how many keys were removed.
    fn prune(&mut self, today: NaiveDate, retention_days: u64) -> usize;
}

/// Oldest date still retained by a prune run on `today`.
pub fn retention_cutoff(today: NaiveDate, retention_days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(retention_days))
        .unwrap_or(NaiveDate::MIN)
}

/// Whether `key` survives a prune with the given cutoff.
///
/// Keys without a parsable date can never match a generated key and are dropped.
pub fn is_retained(key: &NotifiedKey, cutoff: NaiveDate) -> bool {
    key.date().is_some_and(|date| date >= cutoff)
}

/// In-memory ledger, used where nothing needs to survive a restart.
impl NotifiedLedger for BTreeSet<NotifiedKey> {
    fn contains(&self, key: &NotifiedKey) -> bool {
        BTreeSet::contains(self, key)
    }

    fn add(&mut self, key: NotifiedKey) {
        self.insert(key);
    }

    fn prune(&mut self, today: NaiveDate, retention_days: u64) -> usize {
        let cutoff = retention_cutoff(today, retention_days);
        let before = self.len();
        self.retain(|key| is_retained(key, cutoff));
        before - self.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Last day ahead (inclusive) that still triggers a notification.
    /// Holidays on the day itself always notify; `0` turns off both the
    /// tomorrow and the upcoming notices.
    pub days_ahead: u64,
    /// Announced keys older than this many days are forgotten.
    pub retention_days: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            days_ahead: 7,
            retention_days: 60,
        }
    }
}

/// Counts from one [`NotificationPolicy::evaluate`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub emitted: usize,
    pub already_notified: usize,
    pub pruned: usize,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationPolicy {
    config: PolicyConfig,
}

impl NotificationPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Classify `date` against `today`. `None` means no action.
    pub fn classify(&self, date: NaiveDate, today: NaiveDate) -> Option<Window> {
        let days = (date - today).num_days();
        match days {
            0 => Some(Window::Today),
            d if d < 0 || (d as u64) > self.config.days_ahead => None,
            1 => Some(Window::Tomorrow),
            d => Some(Window::WithinWeek { days: d }),
        }
    }

    /// Emit one notification per not-yet-announced holiday in the window,
    /// recording each key in `ledger` right after its emission, then prune.
    pub fn evaluate<L>(
        &self,
        catalog: &HolidayCatalog,
        today: NaiveDate,
        ledger: &mut L,
        mut emit: impl FnMut(Notification),
    ) -> Evaluation
    where
        L: NotifiedLedger + ?Sized,
    {
        let mut eval = Evaluation::default();

        for record in catalog {
            let Some(window) = self.classify(record.date, today) else {
                continue;
            };
            let key = NotifiedKey::for_record(record);
            if ledger.contains(&key) {
                debug!(key = %key, "holiday already notified");
                eval.already_notified += 1;
                continue;
            }
            info!(key = %key, ?window, "notifying holiday");
            emit(Notification::for_holiday(record, window));
            ledger.add(key);
            eval.emitted += 1;
        }

        eval.pruned = ledger.prune(today, self.config.retention_days);
        eval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(y: i32, m: u32, d: u32, name: &str, dow: &str) -> HolidayRecord {
        HolidayRecord::new(date(y, m, d), name, dow)
    }

    fn run(
        policy: &NotificationPolicy,
        catalog: &HolidayCatalog,
        today: NaiveDate,
        ledger: &mut BTreeSet<NotifiedKey>,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        policy.evaluate(catalog, today, ledger, |n| out.push(n));
        out
    }

    #[test]
    fn classify_windows() {
        let policy = NotificationPolicy::default();
        let today = date(2025, 1, 1);
        assert_eq!(policy.classify(today, today), Some(Window::Today));
        assert_eq!(policy.classify(date(2025, 1, 2), today), Some(Window::Tomorrow));
        assert_eq!(
            policy.classify(date(2025, 1, 3), today),
            Some(Window::WithinWeek { days: 2 })
        );
        assert_eq!(
            policy.classify(date(2025, 1, 8), today),
            Some(Window::WithinWeek { days: 7 })
        );
        assert_eq!(policy.classify(date(2025, 1, 9), today), None);
        assert_eq!(policy.classify(date(2024, 12, 31), today), None);
    }

    #[test]
    fn classify_respects_configured_horizon() {
        let policy = NotificationPolicy::new(PolicyConfig {
            days_ahead: 3,
            ..PolicyConfig::default()
        });
        let today = date(2025, 1, 1);
        assert!(policy.classify(date(2025, 1, 4), today).is_some());
        assert!(policy.classify(date(2025, 1, 5), today).is_none());
    }

    #[test]
    fn zero_horizon_only_notifies_today() {
        let policy = NotificationPolicy::new(PolicyConfig {
            days_ahead: 0,
            ..PolicyConfig::default()
        });
        let today = date(2025, 1, 1);
        assert_eq!(policy.classify(today, today), Some(Window::Today));
        assert_eq!(policy.classify(date(2025, 1, 2), today), None);
        assert_eq!(policy.classify(date(2025, 1, 3), today), None);
    }

    #[test]
    fn message_formats() {
        let r = rec(2025, 1, 6, "Thaipusam", "Monday");
        let today = Notification::for_holiday(&r, Window::Today);
        assert_eq!(today.title, "Holiday Today!");
        assert_eq!(today.message, "Thaipusam\nMonday");
        let week = Notification::for_holiday(&r, Window::WithinWeek { days: 5 });
        assert_eq!(week.title, "Upcoming Holiday in 5 days");
        assert_eq!(week.message, "Thaipusam\n2025-01-06 (Monday)");
        assert_eq!(week.kind, NotificationKind::WithinWeek { days: 5 });
    }

    #[test]
    fn emits_once_per_key() {
        let policy = NotificationPolicy::default();
        let catalog = HolidayCatalog::merge(
            vec![
                rec(2025, 1, 1, "New Year", "Monday"),
                rec(2025, 2, 1, "Federal Day", "Wednesday"),
            ],
            Vec::new(),
        );
        let today = date(2025, 1, 1);
        let mut ledger = BTreeSet::new();

        let first = run(&policy, &catalog, today, &mut ledger);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, NotificationKind::Today);
        assert!(ledger.contains(&NotifiedKey::from_stored("2025-01-01_New Year".into())));

        let second = run(&policy, &catalog, today, &mut ledger);
        assert!(second.is_empty());
    }

    #[test]
    fn duplicate_records_in_one_catalog_emit_once() {
        let policy = NotificationPolicy::default();
        let catalog = HolidayCatalog::merge(
            vec![rec(2025, 1, 2, "New Year", "Thursday")],
            vec![rec(2025, 1, 2, "New Year", "Thursday")],
        );
        let mut ledger = BTreeSet::new();
        let out = run(&policy, &catalog, date(2025, 1, 1), &mut ledger);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, NotificationKind::Tomorrow);
    }

    #[test]
    fn evaluate_prunes_after_emitting() {
        let policy = NotificationPolicy::default();
        let today = date(2025, 3, 3);
        let mut ledger: BTreeSet<NotifiedKey> = [
            NotifiedKey::new(date(2025, 1, 1), "Old"),
            NotifiedKey::new(date(2025, 3, 1), "Recent"),
        ]
        .into_iter()
        .collect();
        let eval = policy.evaluate(&HolidayCatalog::default(), today, &mut ledger, |_| {});
        assert_eq!(eval.pruned, 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn prune_boundary_60_kept_61_dropped() {
        let today = date(2025, 6, 1);
        let mut ledger: BTreeSet<NotifiedKey> = [
            NotifiedKey::new(today - Days::new(60), "Kept"),
            NotifiedKey::new(today - Days::new(61), "Dropped"),
            NotifiedKey::from_stored("not-a-date_Junk".into()),
        ]
        .into_iter()
        .collect();
        assert_eq!(NotifiedLedger::prune(&mut ledger, today, 60), 2);
        let left: Vec<&str> = ledger.iter().map(NotifiedKey::as_str).collect();
        assert_eq!(left, vec!["2025-04-02_Kept"]);
    }
}
