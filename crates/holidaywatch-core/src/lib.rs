//! Core holiday types: raw rows, normalised records, the per-cycle catalog,
//! and the notification policy with its ledger seam.

pub mod catalog;
pub mod clock;
pub mod key;
pub mod normalize;
pub mod policy;
pub mod record;
pub mod source;

pub use catalog::HolidayCatalog;
pub use clock::{Clock, FixedClock, LocalClock};
pub use key::NotifiedKey;
pub use normalize::{normalize, normalize_rows};
pub use policy::{
    Evaluation, Notification, NotificationKind, NotificationPolicy, NotifiedLedger, PolicyConfig,
    Window,
};
pub use record::{HolidayRecord, RawRow, YearRows};
pub use source::HolidaySource;
