use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};

use crate::config::ScheduleConfig;
use crate::db::{contractdb::ContractExt, db::DBClient, visitdb::ServiceVisitExt};
use crate::models::contractmodel::Contract;
use crate::models::servicerequestmodel::Frequency;
use crate::service::{error::ServiceError, recurrence};

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn matches_work_day(date: NaiveDate, work_days: &[String]) -> bool {
    let name = weekday_name(date.weekday());
    work_days.iter().any(|day| day.eq_ignore_ascii_case(name))
}

/// Steps `reference` forward by the service cadence, then rolls forward at
/// most 7 single-day steps to land on a configured work day. When the work
/// day list never matches (bad data), the unadjusted date is kept.
pub fn next_service_date(
    reference: NaiveDate,
    frequency: Frequency,
    work_days: Option<&[String]>,
) -> NaiveDate {
    let candidate = reference + Duration::days(recurrence::interval_days(frequency));

    let Some(days) = work_days.filter(|days| !days.is_empty()) else {
        return candidate;
    };

    let mut adjusted = candidate;
    for _ in 0..7 {
        if matches_work_day(adjusted, days) {
            return adjusted;
        }
        adjusted += Duration::days(1);
    }

    candidate
}

/// All visit dates a contract should have between its anchor and the
/// horizon. Dates are strictly increasing and never before `today`; the
/// first entry repeats the last known visit date (if still >= today) so the
/// caller's existence check anchors dedup there.
pub fn plan_visit_dates(
    start_date: NaiveDate,
    today: NaiveDate,
    horizon: NaiveDate,
    frequency: Frequency,
    work_days: Option<&[String]>,
    last_visit: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    let anchor = last_visit.unwrap_or(start_date);
    let mut reference = if today > anchor { today } else { anchor };

    let mut dates = Vec::new();
    while reference <= horizon {
        dates.push(reference);
        let next = next_service_date(reference, frequency, work_days);
        if next <= reference {
            break;
        }
        reference = next;
    }
    dates
}

#[derive(Debug, Clone)]
pub struct VisitScheduler {
    db_client: Arc<DBClient>,
    schedule: ScheduleConfig,
}

impl VisitScheduler {
    pub fn new(db_client: Arc<DBClient>, schedule: ScheduleConfig) -> Self {
        Self { db_client, schedule }
    }

    /// Daily tick entry point. Contracts are processed independently; one
    /// failure is logged and the rest of the batch continues.
    pub async fn generate_upcoming_visits(&self) -> Result<(), ServiceError> {
        let contracts = self.db_client.find_active_contracts().await?;

        let today = Utc::now().date_naive();
        let horizon = today + Duration::days(self.schedule.visit_horizon_days);

        for contract in &contracts {
            if let Err(error) = self
                .ensure_visits_for_contract(contract, today, horizon)
                .await
            {
                tracing::error!(
                    "Failed to schedule visits for contract {}: {}",
                    contract.contract_number,
                    error
                );
            }
        }

        Ok(())
    }

    /// Ensures a pending visit exists for every due occurrence up to the
    /// horizon. Running this twice with the same inputs creates nothing the
    /// second time.
    pub async fn ensure_visits_for_contract(
        &self,
        contract: &Contract,
        today: NaiveDate,
        horizon: NaiveDate,
    ) -> Result<u32, ServiceError> {
        let last_visit = self.db_client.find_latest_visit(contract.id).await?;

        let dates = plan_visit_dates(
            contract.start_date,
            today,
            horizon,
            contract.service_frequency,
            contract.work_days.as_deref(),
            last_visit.map(|visit| visit.scheduled_date),
        );

        let mut created = 0u32;
        for date in dates {
            if self.db_client.visit_exists_on(contract.id, date).await? {
                continue;
            }

            let inserted = self
                .db_client
                .create_visit(
                    contract.id,
                    contract.service_request_id,
                    date,
                    contract.work_start_time,
                )
                .await?;

            if let Some(visit) = inserted {
                created += 1;
                tracing::info!(
                    "Created service visit for contract {} on {}",
                    contract.contract_number,
                    visit.scheduled_date
                );
            }
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_weekly_plan_from_contract_start() {
        // 2025-03-01 is a Saturday
        let dates = plan_visit_dates(
            date(2025, 3, 1),
            date(2025, 3, 1),
            date(2025, 3, 31),
            Frequency::Weekly,
            None,
            None,
        );
        assert_eq!(
            dates,
            vec![
                date(2025, 3, 1),
                date(2025, 3, 8),
                date(2025, 3, 15),
                date(2025, 3, 22),
                date(2025, 3, 29),
            ]
        );
    }

    #[test]
    fn test_plan_never_schedules_before_today() {
        let dates = plan_visit_dates(
            date(2025, 1, 1),
            date(2025, 3, 10),
            date(2025, 3, 31),
            Frequency::Weekly,
            None,
            None,
        );
        assert!(dates.iter().all(|d| *d >= date(2025, 3, 10)));
        assert_eq!(dates.first(), Some(&date(2025, 3, 10)));
    }

    #[test]
    fn test_plan_resumes_from_last_visit() {
        let dates = plan_visit_dates(
            date(2025, 3, 1),
            date(2025, 3, 2),
            date(2025, 3, 31),
            Frequency::Weekly,
            None,
            Some(date(2025, 3, 15)),
        );
        // The last visit date leads the plan; dedup filters it out downstream.
        assert_eq!(
            dates,
            vec![date(2025, 3, 15), date(2025, 3, 22), date(2025, 3, 29)]
        );
    }

    #[test]
    fn test_plan_dates_strictly_increasing() {
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::BiWeekly,
            Frequency::Monthly,
            Frequency::Quarterly,
        ] {
            let dates = plan_visit_dates(
                date(2025, 1, 1),
                date(2025, 1, 1),
                date(2025, 12, 31),
                frequency,
                None,
                None,
            );
            for pair in dates.windows(2) {
                assert!(pair[0] < pair[1], "{:?} produced unordered dates", frequency);
            }
        }
    }

    #[test]
    fn test_planning_is_idempotent() {
        let plan = |last_visit| {
            plan_visit_dates(
                date(2025, 3, 1),
                date(2025, 3, 1),
                date(2025, 3, 31),
                Frequency::Weekly,
                None,
                last_visit,
            )
        };

        // First run creates every planned date.
        let first = plan(None);
        let mut existing: HashSet<NaiveDate> = first.iter().copied().collect();

        // Second run, anchored on the latest created visit, proposes nothing new.
        let last = first.last().copied();
        let second = plan(last);
        let fresh: Vec<_> = second
            .into_iter()
            .filter(|d| !existing.contains(d))
            .collect();
        assert!(fresh.is_empty());

        // And replaying the first plan against the existing set is a no-op too.
        let replay: Vec<_> = plan(None)
            .into_iter()
            .filter(|d| existing.insert(*d))
            .collect();
        assert!(replay.is_empty());
    }

    #[test]
    fn test_work_day_roll_forward() {
        // 2025-03-01 is a Saturday; +7d lands on Saturday 2025-03-08, which
        // then rolls forward to Monday 2025-03-10.
        let work_days = days(&["monday", "wednesday"]);
        let next = next_service_date(date(2025, 3, 1), Frequency::Weekly, Some(&work_days));
        assert_eq!(next, date(2025, 3, 10));
    }

    #[test]
    fn test_work_day_names_are_case_insensitive() {
        let work_days = days(&["Monday"]);
        let next = next_service_date(date(2025, 3, 1), Frequency::Weekly, Some(&work_days));
        assert_eq!(next, date(2025, 3, 10));
    }

    #[test]
    fn test_unmatchable_work_days_keep_unadjusted_date() {
        let work_days = days(&["someday"]);
        let next = next_service_date(date(2025, 3, 1), Frequency::Weekly, Some(&work_days));
        assert_eq!(next, date(2025, 3, 8));
    }

    #[test]
    fn test_empty_work_day_list_is_ignored() {
        let work_days: Vec<String> = vec![];
        let next = next_service_date(date(2025, 3, 1), Frequency::Weekly, Some(&work_days));
        assert_eq!(next, date(2025, 3, 8));
    }
}
