use crate::models::contractmodel::Contract;
use crate::models::propertymodel::Property;
use crate::models::servicerequestmodel::Frequency;
use crate::models::usermodel::User;

pub fn format_payment_frequency(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::OneTime => "One-Time Payment",
        Frequency::Daily => "Daily",
        Frequency::Weekly => "Weekly",
        Frequency::BiWeekly => "Bi-Weekly",
        Frequency::Monthly => "Monthly",
        Frequency::Quarterly => "Quarterly",
    }
}

/// Renders the contract fact sheet embedded in the approval mail and shown
/// on the dashboard. Plain HTML; no PDF engine involved.
pub fn render_contract_sheet(contract: &Contract, client: &User, property: &Property) -> String {
    let end_date = contract
        .end_date
        .map(|date| date.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| "Open-ended".to_string());

    let next_payment_due = contract
        .next_payment_due
        .map(|date| date.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    let work_days = contract
        .work_days
        .as_ref()
        .filter(|days| !days.is_empty())
        .map(|days| days.join(", "))
        .unwrap_or_else(|| "Any day".to_string());

    format!(
        r#"<div class="contract-sheet">
  <h3>Service Contract {number}</h3>
  <table cellpadding="4">
    <tr><td>Client</td><td>{client}</td></tr>
    <tr><td>Property</td><td>{property} — {address}</td></tr>
    <tr><td>Start date</td><td>{start}</td></tr>
    <tr><td>End date</td><td>{end}</td></tr>
    <tr><td>Payment</td><td>{amount} ({frequency})</td></tr>
    <tr><td>Next payment due</td><td>{due}</td></tr>
    <tr><td>Service days</td><td>{work_days}</td></tr>
  </table>
</div>"#,
        number = contract.contract_number,
        client = client.full_name(),
        property = property.name,
        address = property.address,
        start = contract.start_date.format("%B %d, %Y"),
        end = end_date,
        amount = contract.payment_amount,
        frequency = format_payment_frequency(contract.payment_frequency),
        due = next_payment_due,
        work_days = work_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_payment_frequency() {
        assert_eq!(format_payment_frequency(Frequency::OneTime), "One-Time Payment");
        assert_eq!(format_payment_frequency(Frequency::BiWeekly), "Bi-Weekly");
        assert_eq!(format_payment_frequency(Frequency::Quarterly), "Quarterly");
    }
}
