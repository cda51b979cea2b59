use chrono::{Months, NaiveTime};
use num_traits::Zero;
use sqlx::types::BigDecimal;

use crate::models::contractmodel::{ContractStatus, NewContract};
use crate::models::servicemodel::Service;
use crate::models::servicerequestmodel::ServiceRequest;
use crate::service::{error::ServiceError, recurrence};

/// Candidate payment amounts in priority order: the first positive value
/// wins. `estimated` already carries any admin confirmed-price override.
#[derive(Debug, Default, Clone)]
pub struct PriceQuote {
    pub actual: Option<BigDecimal>,
    pub recalculated: Option<BigDecimal>,
    pub estimated: Option<BigDecimal>,
}

/// Admin-supplied extras applied while turning an approved request into a
/// contract. Everything is optional; the request fills the gaps.
#[derive(Debug, Default, Clone)]
pub struct ContractBuildOptions {
    pub admin_note: Option<String>,
    pub terms: Option<String>,
    pub scope: Option<String>,
    pub work_days: Option<Vec<String>>,
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
}

pub fn resolve_payment_amount(quote: &PriceQuote) -> Result<BigDecimal, ServiceError> {
    [&quote.actual, &quote.recalculated, &quote.estimated]
        .into_iter()
        .flatten()
        .find(|amount| **amount > BigDecimal::zero())
        .cloned()
        .ok_or(ServiceError::MissingPrice)
}

/// Quote derived from the service catalog plus any product line items:
/// base price, a per-minute rate applied to the estimated duration, and the
/// summed line items. None when no source contributes.
pub fn recalculated_price(
    service: Option<&Service>,
    estimated_duration_minutes: Option<i32>,
    product_line_total: Option<BigDecimal>,
) -> Option<BigDecimal> {
    let service_part = service.map(|service| {
        let mut price = service.base_price.clone();
        if let (Some(rate), Some(minutes)) =
            (service.price_per_minute.as_ref(), estimated_duration_minutes)
        {
            price += rate * BigDecimal::from(minutes);
        }
        price
    });

    match (service_part, product_line_total) {
        (Some(service_total), Some(products)) => Some(service_total + products),
        (Some(service_total), None) => Some(service_total),
        (None, Some(products)) => Some(products),
        (None, None) => None,
    }
}

/// Derives a ready-to-persist contract from an approved service request.
/// Pure: persistence (and the contract number) is the caller's concern.
pub fn build(
    request: &ServiceRequest,
    quote: &PriceQuote,
    options: &ContractBuildOptions,
) -> Result<NewContract, ServiceError> {
    let payment_amount = resolve_payment_amount(quote)?;

    let payment_frequency = request.recurrence_frequency.payment_view();
    let start_date = request.scheduled_date;

    let end_date = match request.recurrence_end_date {
        Some(end) => Some(end),
        None if request.is_recurring => start_date.checked_add_months(Months::new(12)),
        None => None,
    };

    if let Some(end) = end_date {
        if end < start_date {
            return Err(ServiceError::InvalidDateRange {
                start: start_date,
                end,
            });
        }
    }

    // A one-time contract is due immediately; the caller must charge it
    // synchronously instead of leaving it to the periodic monitor.
    let next_payment_due = match recurrence::next_occurrence(start_date, payment_frequency) {
        Some(due) => Some(due),
        None => Some(start_date),
    };

    Ok(NewContract {
        client_id: request.user_id,
        property_id: request.property_id,
        service_request_id: Some(request.id),

        status: ContractStatus::Active,
        start_date,
        end_date,

        payment_amount,
        payment_frequency,
        next_payment_due,

        work_days: options.work_days.clone(),
        work_start_time: options.work_start_time.or(Some(request.scheduled_time)),
        work_end_time: options.work_end_time,
        service_frequency: request.recurrence_frequency,

        terms: options.terms.clone(),
        notes: options.admin_note.clone(),
        scope: options.scope.clone(),

        is_active: true,
        estimated_duration_minutes: request.estimated_duration_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::servicerequestmodel::{
        Frequency, ServiceRequestPriority, ServiceRequestStatus,
    };
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn decimal(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    fn sample_request(frequency: Frequency, is_recurring: bool) -> ServiceRequest {
        ServiceRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            status: ServiceRequestStatus::Pending,
            priority: ServiceRequestPriority::Normal,
            scheduled_date: date(2025, 3, 1),
            scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            walkthrough_date: None,
            walkthrough_time: None,
            completed_date: None,
            estimated_price: decimal("120.00"),
            actual_price: None,
            estimated_duration_minutes: None,
            actual_duration_minutes: None,
            is_recurring,
            recurrence_frequency: frequency,
            recurrence_end_date: None,
            cancellation_reason: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn estimated_only(raw: &str) -> PriceQuote {
        PriceQuote {
            estimated: Some(decimal(raw)),
            ..Default::default()
        }
    }

    #[test]
    fn test_weekly_recurring_request_builds_weekly_contract() {
        let request = sample_request(Frequency::Weekly, true);
        let contract =
            build(&request, &estimated_only("120.00"), &Default::default()).unwrap();

        assert_eq!(contract.payment_frequency, Frequency::Weekly);
        assert_eq!(contract.start_date, date(2025, 3, 1));
        assert_eq!(contract.end_date, Some(date(2026, 3, 1)));
        assert_eq!(contract.next_payment_due, Some(date(2025, 3, 8)));
        assert_eq!(contract.status, ContractStatus::Active);
        assert!(contract.is_active);
        assert_eq!(contract.payment_amount, decimal("120.00"));
    }

    #[test]
    fn test_one_time_contract_is_due_immediately() {
        let request = sample_request(Frequency::OneTime, false);
        let contract =
            build(&request, &estimated_only("300.00"), &Default::default()).unwrap();

        assert_eq!(contract.payment_frequency, Frequency::OneTime);
        assert_eq!(contract.next_payment_due, Some(date(2025, 3, 1)));
        assert_eq!(contract.end_date, None);
    }

    #[test]
    fn test_daily_service_is_billed_one_time() {
        let request = sample_request(Frequency::Daily, true);
        let contract =
            build(&request, &estimated_only("80.00"), &Default::default()).unwrap();

        assert_eq!(contract.payment_frequency, Frequency::OneTime);
        assert_eq!(contract.service_frequency, Frequency::Daily);
        assert_eq!(contract.next_payment_due, Some(date(2025, 3, 1)));
    }

    #[test]
    fn test_explicit_recurrence_end_date_wins() {
        let mut request = sample_request(Frequency::Monthly, true);
        request.recurrence_end_date = Some(date(2025, 9, 30));

        let contract =
            build(&request, &estimated_only("120.00"), &Default::default()).unwrap();
        assert_eq!(contract.end_date, Some(date(2025, 9, 30)));
    }

    #[test]
    fn test_end_date_before_start_is_rejected() {
        let mut request = sample_request(Frequency::Monthly, true);
        request.recurrence_end_date = Some(date(2025, 2, 1));

        let result = build(&request, &estimated_only("120.00"), &Default::default());
        assert!(matches!(result, Err(ServiceError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_price_resolution_priority() {
        let quote = PriceQuote {
            actual: Some(decimal("150.00")),
            recalculated: Some(decimal("140.00")),
            estimated: Some(decimal("120.00")),
        };
        assert_eq!(resolve_payment_amount(&quote).unwrap(), decimal("150.00"));

        let quote = PriceQuote {
            actual: None,
            recalculated: Some(decimal("140.00")),
            estimated: Some(decimal("120.00")),
        };
        assert_eq!(resolve_payment_amount(&quote).unwrap(), decimal("140.00"));

        // Zero is not a usable price; resolution falls through to the next source
        let quote = PriceQuote {
            actual: Some(decimal("0.00")),
            recalculated: None,
            estimated: Some(decimal("120.00")),
        };
        assert_eq!(resolve_payment_amount(&quote).unwrap(), decimal("120.00"));
    }

    #[test]
    fn test_missing_price_is_an_error() {
        let quote = PriceQuote {
            actual: None,
            recalculated: None,
            estimated: Some(decimal("0.00")),
        };
        assert!(matches!(
            resolve_payment_amount(&quote),
            Err(ServiceError::MissingPrice)
        ));

        let request = sample_request(Frequency::Weekly, true);
        assert!(matches!(
            build(&request, &PriceQuote::default(), &Default::default()),
            Err(ServiceError::MissingPrice)
        ));
    }

    #[test]
    fn test_recalculated_price_combines_service_and_products() {
        let service = Service {
            id: Uuid::new_v4(),
            name: "Deep cleaning".to_string(),
            description: None,
            base_price: decimal("100.00"),
            price_per_minute: Some(decimal("0.50")),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // 100 + 0.50 * 60 + 25 = 155
        assert_eq!(
            recalculated_price(Some(&service), Some(60), Some(decimal("25.00"))),
            Some(decimal("155.00"))
        );
        // No duration: rate is ignored
        assert_eq!(
            recalculated_price(Some(&service), None, None),
            Some(decimal("100.00"))
        );
        assert_eq!(recalculated_price(None, Some(60), None), None);
    }

    #[test]
    fn test_work_schedule_defaults_to_request_time() {
        let request = sample_request(Frequency::Weekly, true);
        let contract =
            build(&request, &estimated_only("120.00"), &Default::default()).unwrap();
        assert_eq!(
            contract.work_start_time,
            Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
    }
}
