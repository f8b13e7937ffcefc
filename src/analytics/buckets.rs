//! Fixed-size time buckets: weekdays for the weekly trend, months for the yearly overview.

use chrono::{Datelike, Weekday};
use serde::Serialize;
use strum::EnumString;
use utoipa::ToSchema;

use super::period::record_date;
use crate::model::{Expense, Income, Payroll, WorkLog};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// First day of the week in the console's locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn first_day(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Bucket index of `day` in this week order.
    pub fn index_of(self, day: Weekday) -> usize {
        match self {
            WeekStart::Sunday => day.num_days_from_sunday() as usize,
            WeekStart::Monday => day.num_days_from_monday() as usize,
        }
    }

    pub fn days(self) -> [Weekday; 7] {
        let mut days = [self.first_day(); 7];
        for i in 1..7 {
            days[i] = days[i - 1].succ();
        }
        days
    }

    pub fn labels(self) -> Vec<String> {
        self.days().iter().map(|d| d.to_string()).collect()
    }
}

/// Sum `measure` per bucket. Records whose bucket is `None` or out of range are skipped.
pub fn bucket_sum<T, B, M>(records: &[T], buckets: usize, bucket_of: B, measure: M) -> Vec<f64>
where
    B: Fn(&T) -> Option<usize>,
    M: Fn(&T) -> f64,
{
    let mut sums = vec![0.0; buckets];
    for record in records {
        if let Some(slot) = bucket_of(record).and_then(|i| sums.get_mut(i)) {
            *slot += measure(record);
        }
    }
    sums
}

/// Index of the bucket with the strictly highest sum. Ties keep the earliest
/// bucket; a series with nothing above zero has no best bucket.
pub fn best_bucket(sums: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in sums.iter().enumerate() {
        if v > best.map_or(0.0, |(_, b)| b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeeklyTrend {
    #[schema(example = json!(["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]))]
    pub labels: Vec<String>,
    /// Sum of work-log `totalPrice` per weekday.
    pub values: Vec<f64>,
    #[schema(example = "Mon", nullable = true)]
    pub best_day: Option<String>,
}

pub fn weekly_trend(work_logs: &[&WorkLog], week_start: WeekStart) -> WeeklyTrend {
    let values = bucket_sum(
        work_logs,
        7,
        |w| record_date(*w, |w| w.updated_at.as_deref()).map(|d| week_start.index_of(d.weekday())),
        |w| w.total_price,
    );
    let labels = week_start.labels();
    let best_day = best_bucket(&values).map(|i| labels[i].clone());

    WeeklyTrend {
        labels,
        values,
        best_day,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct YearlyOverview {
    /// `None` when aggregated across all years.
    #[schema(example = 2024, nullable = true)]
    pub year: Option<i32>,
    pub labels: Vec<String>,
    pub income: Vec<f64>,
    pub expense: Vec<f64>,
    pub payroll: Vec<f64>,
    /// Month with the strictly highest income.
    #[schema(example = "Mar", nullable = true)]
    pub best_month: Option<String>,
}

fn month_bucket<T>(year: Option<i32>, date_of: impl Fn(&T) -> Option<&str>) -> impl Fn(&T) -> Option<usize> {
    move |r: &T| {
        record_date(r, &date_of)
            .filter(|d| year.is_none_or(|y| d.year() == y))
            .map(|d| d.month0() as usize)
    }
}

/// Three parallel 12-month series for one year, or summed over every year.
/// `payrolls` must already be restricted to resolvable employees.
pub fn yearly_overview(
    year: Option<i32>,
    incomes: &[&Income],
    expenses: &[&Expense],
    payrolls: &[&Payroll],
) -> YearlyOverview {
    let income = bucket_sum(incomes, 12, month_bucket(year, |i: &&Income| i.date.as_deref()), |i| i.amount);
    let expense = bucket_sum(expenses, 12, month_bucket(year, |e: &&Expense| e.date.as_deref()), |e| e.amount);
    let payroll = bucket_sum(
        payrolls,
        12,
        month_bucket(year, |p: &&Payroll| p.period.as_deref()),
        |p| p.total_salary,
    );
    let best_month = best_bucket(&income).map(|i| MONTH_LABELS[i].to_string());

    YearlyOverview {
        year,
        labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        income,
        expense,
        payroll,
        best_month,
    }
}
