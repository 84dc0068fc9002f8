//! subtally-core: recurring-payment projection engine for subscription tracking

pub mod aggregate;
pub mod calendar;
pub mod error;
pub mod money;
pub mod notices;
pub mod recurrence;
pub mod subscription;
pub mod time;
pub mod upcoming;
pub mod urgency;

pub use aggregate::{SkippedSubscription, Totals, aggregate};
pub use calendar::{CalendarDay, CalendarEntry, MonthCalendar, month_calendar};
pub use error::{CoreError, Result};
pub use money::{
    base_amount, exchange_rate_from_f64, monthly_equivalent, parse_exchange_rate,
    validate_exchange_rate, yearly_equivalent,
};
pub use notices::{NoticeKind, NotificationPolicy, PaymentNotice, project_payment_notices};
pub use recurrence::{
    Occurrence, clamp_to_month, days_in_month, next_occurrence, occurrences_between,
};
pub use subscription::{Currency, PaymentCycle, Subscription, SubscriptionStatus, parse_cycle};
pub use time::{parse_year_month, today_in_timezone, week_bounds};
pub use upcoming::{SortKey, StatusFilter, UpcomingPayment, UpcomingQuery, upcoming_payments};
pub use urgency::{UrgencyTier, classify_urgency};
