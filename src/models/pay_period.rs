use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Stagger group for bi-weekly payroll. Group B's periods start one week
/// after group A's, so the two groups' pay dates interleave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PeriodGroup {
    A,
    B,
}

impl PeriodGroup {
    pub const ALL: [PeriodGroup; 2] = [PeriodGroup::A, PeriodGroup::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodGroup::A => "A",
            PeriodGroup::B => "B",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(PeriodGroup::A),
            "B" => Some(PeriodGroup::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriodStatus {
    Open,
    Closed,
    Processed,
}

impl PayPeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayPeriodStatus::Open => "open",
            PayPeriodStatus::Closed => "closed",
            PayPeriodStatus::Processed => "processed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(PayPeriodStatus::Open),
            "closed" => Some(PayPeriodStatus::Closed),
            "processed" => Some(PayPeriodStatus::Processed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayPeriod {
    pub id: Uuid,
    pub period_group: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payroll_run_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A period the generator intends to create: 14 days inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSpan {
    pub group: PeriodGroup,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub const PERIOD_LENGTH_DAYS: u64 = 14;
const GROUP_B_OFFSET_DAYS: u64 = 7;

/// Plans bi-weekly periods for both stagger groups starting at `start_date`.
/// Produces `weeks / 2` periods per group (odd week counts drop the
/// remainder), each exactly 14 days inclusive and non-overlapping within
/// its group by construction.
pub fn plan_periods(start_date: NaiveDate, weeks: u32) -> Vec<PeriodSpan> {
    let mut spans = Vec::new();

    for group in PeriodGroup::ALL {
        let group_start = match group {
            PeriodGroup::A => start_date,
            PeriodGroup::B => start_date + Days::new(GROUP_B_OFFSET_DAYS),
        };

        for i in 0..(weeks / 2) {
            let period_start = group_start + Days::new(PERIOD_LENGTH_DAYS * u64::from(i));
            let period_end = period_start + Days::new(PERIOD_LENGTH_DAYS - 1);
            spans.push(PeriodSpan {
                group,
                start_date: period_start,
                end_date: period_end,
            });
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_plan_produces_half_as_many_periods_as_weeks_per_group() {
        let spans = plan_periods(d(2025, 1, 5), 8);

        let group_a: Vec<_> = spans.iter().filter(|s| s.group == PeriodGroup::A).collect();
        let group_b: Vec<_> = spans.iter().filter(|s| s.group == PeriodGroup::B).collect();

        assert_eq!(group_a.len(), 4);
        assert_eq!(group_b.len(), 4);
    }

    #[test]
    fn test_plan_periods_are_fourteen_days_inclusive() {
        let spans = plan_periods(d(2025, 1, 5), 6);

        for span in &spans {
            let width = (span.end_date - span.start_date).num_days() + 1;
            assert_eq!(width, 14);
        }
    }

    #[test]
    fn test_group_b_offset_by_one_week() {
        let spans = plan_periods(d(2025, 1, 5), 2);

        let a = spans.iter().find(|s| s.group == PeriodGroup::A).unwrap();
        let b = spans.iter().find(|s| s.group == PeriodGroup::B).unwrap();

        assert_eq!(a.start_date, d(2025, 1, 5));
        assert_eq!(a.end_date, d(2025, 1, 18));
        assert_eq!(b.start_date, d(2025, 1, 12));
        assert_eq!(b.end_date, d(2025, 1, 25));
    }

    #[test]
    fn test_periods_within_a_group_do_not_overlap() {
        let spans = plan_periods(d(2025, 3, 2), 12);

        for group in PeriodGroup::ALL {
            let mut group_spans: Vec<_> =
                spans.iter().filter(|s| s.group == group).collect();
            group_spans.sort_by_key(|s| s.start_date);

            for pair in group_spans.windows(2) {
                assert!(pair[0].end_date < pair[1].start_date);
            }
        }
    }

    #[test]
    fn test_odd_weeks_drops_remainder() {
        let spans = plan_periods(d(2025, 1, 5), 5);
        // 5 / 2 == 2 periods per group
        assert_eq!(spans.len(), 4);
    }

    #[test]
    fn test_zero_and_one_week_plans_are_empty() {
        assert!(plan_periods(d(2025, 1, 5), 0).is_empty());
        assert!(plan_periods(d(2025, 1, 5), 1).is_empty());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            PayPeriodStatus::Open,
            PayPeriodStatus::Closed,
            PayPeriodStatus::Processed,
        ] {
            assert_eq!(PayPeriodStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PayPeriodStatus::parse("reopened"), None);
    }

    #[test]
    fn test_group_parse_rejects_unknown() {
        assert_eq!(PeriodGroup::parse("A"), Some(PeriodGroup::A));
        assert_eq!(PeriodGroup::parse("B"), Some(PeriodGroup::B));
        assert_eq!(PeriodGroup::parse("C"), None);
        assert_eq!(PeriodGroup::parse("a"), None);
    }
}
