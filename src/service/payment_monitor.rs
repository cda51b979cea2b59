use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use crate::config::ScheduleConfig;
use crate::db::{contractdb::ContractExt, db::DBClient, paymentdb::PaymentExt};
use crate::models::contractmodel::Contract;
use crate::service::error::ServiceError;
use crate::service::payment_service::PaymentService;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObligationKind {
    Upcoming { lead_days: i64 },
    Overdue,
}

impl ObligationKind {
    fn describe(&self) -> String {
        match self {
            ObligationKind::Upcoming { lead_days } => format!("upcoming ({}d lead)", lead_days),
            ObligationKind::Overdue => "overdue".to_string(),
        }
    }
}

/// Classifies a due date against today. Upcoming only fires on an exact
/// lead-day match so each threshold acts once per due cycle.
pub fn classify_due_date(
    due: NaiveDate,
    today: NaiveDate,
    lead_days: &[i64],
) -> Option<ObligationKind> {
    if due < today {
        return Some(ObligationKind::Overdue);
    }

    let days_until = (due - today).num_days();
    lead_days
        .iter()
        .find(|&&lead| lead == days_until)
        .map(|&lead| ObligationKind::Upcoming { lead_days: lead })
}

/// Scans active contracts for payments that are coming due or already
/// overdue, and raises exactly one pending payment per contract per cycle.
/// Policy: this monitor always creates the payment (and mails the payment
/// link); it never runs in log-only reminder mode.
#[derive(Debug, Clone)]
pub struct PaymentObligationMonitor {
    db_client: Arc<DBClient>,
    payment_service: Arc<PaymentService>,
    schedule: ScheduleConfig,
}

impl PaymentObligationMonitor {
    pub fn new(
        db_client: Arc<DBClient>,
        payment_service: Arc<PaymentService>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            db_client,
            payment_service,
            schedule,
        }
    }

    /// One monitor tick. Both passes always run to completion; per-contract
    /// failures are logged and skipped.
    pub async fn scan(&self) -> Result<(), ServiceError> {
        let today = Utc::now().date_naive();
        self.scan_upcoming(today).await;
        self.scan_overdue(today).await;
        Ok(())
    }

    async fn scan_upcoming(&self, today: NaiveDate) {
        for &lead_days in &self.schedule.payment_lead_days {
            let due_on = today + Duration::days(lead_days);

            let contracts = match self.db_client.find_contracts_due_on(due_on).await {
                Ok(contracts) => contracts,
                Err(error) => {
                    tracing::error!(
                        "Failed to load contracts due in {} days: {}",
                        lead_days,
                        error
                    );
                    continue;
                }
            };

            for contract in &contracts {
                self.raise_obligation(contract, ObligationKind::Upcoming { lead_days }, today)
                    .await;
            }
        }
    }

    async fn scan_overdue(&self, today: NaiveDate) {
        let contracts = match self.db_client.find_overdue_contracts(today).await {
            Ok(contracts) => contracts,
            Err(error) => {
                tracing::error!("Failed to load overdue contracts: {}", error);
                return;
            }
        };

        for contract in &contracts {
            self.raise_obligation(contract, ObligationKind::Overdue, today).await;
        }
    }

    async fn raise_obligation(&self, contract: &Contract, kind: ObligationKind, today: NaiveDate) {
        // Sanity check against a racing schedule advance between the query
        // and this call; the insert-level guard remains authoritative.
        let still_relevant = contract
            .next_payment_due
            .and_then(|due| classify_due_date(due, today, &self.schedule.payment_lead_days));
        if still_relevant.is_none() {
            return;
        }

        // Cheap pre-check to skip contracts that obviously already have an
        // open payment; the unique index still catches the race.
        match self.db_client.has_active_payment(contract.id).await {
            Ok(true) => {
                tracing::debug!(
                    "Contract {} already has an active payment",
                    contract.contract_number
                );
                return;
            }
            Ok(false) => {}
            Err(error) => {
                tracing::error!(
                    "Failed to check active payments for contract {}: {}",
                    contract.contract_number,
                    error
                );
                return;
            }
        }

        match self.payment_service.create_for_contract(contract).await {
            Ok(payment) => {
                tracing::info!(
                    "Raised {} payment {} for contract {} due {:?}",
                    kind.describe(),
                    payment.reference,
                    contract.contract_number,
                    contract.next_payment_due
                );
            }
            Err(ServiceError::DuplicateObligation(_)) => {
                tracing::debug!(
                    "Contract {} already has an active payment, skipping {}",
                    contract.contract_number,
                    kind.describe()
                );
            }
            Err(error) => {
                tracing::error!(
                    "Failed to raise {} payment for contract {}: {}",
                    kind.describe(),
                    contract.contract_number,
                    error
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const LEADS: [i64; 4] = [10, 7, 3, 1];

    #[test]
    fn test_overdue_classification() {
        assert_eq!(
            classify_due_date(date(2025, 3, 1), date(2025, 3, 2), &LEADS),
            Some(ObligationKind::Overdue)
        );
    }

    #[test]
    fn test_upcoming_requires_exact_lead_match() {
        let today = date(2025, 3, 1);
        assert_eq!(
            classify_due_date(date(2025, 3, 8), today, &LEADS),
            Some(ObligationKind::Upcoming { lead_days: 7 })
        );
        assert_eq!(
            classify_due_date(date(2025, 3, 11), today, &LEADS),
            Some(ObligationKind::Upcoming { lead_days: 10 })
        );
        // 5 days out matches no threshold
        assert_eq!(classify_due_date(date(2025, 3, 6), today, &LEADS), None);
        // Due today matches no threshold; it becomes overdue tomorrow
        assert_eq!(classify_due_date(today, today, &LEADS), None);
    }

    #[test]
    fn test_each_due_date_matches_at_most_one_threshold() {
        let today = date(2025, 3, 1);
        for offset in 0..30 {
            let due = today + Duration::days(offset);
            let matches = LEADS
                .iter()
                .filter(|&&lead| classify_due_date(due, today, &[lead]).is_some())
                .count();
            assert!(matches <= 1, "due {:+}d matched {} thresholds", offset, matches);
        }
    }
}
