use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::db::{
    contractdb::ContractExt, db::DBClient, propertydb::PropertyExt,
    servicedb::ServiceCatalogExt, servicerequestdb::ServiceRequestExt, userdb::UserExt,
};
use crate::dtos::servicerequestdtos::ApproveServiceRequestDto;
use crate::models::contractmodel::Contract;
use crate::models::paymentmodel::Payment;
use crate::models::servicerequestmodel::{Frequency, ServiceRequest, ServiceRequestStatus};
use crate::models::usermodel::User;
use crate::service::contract_document::render_contract_sheet;
use crate::service::contract_factory::{self, ContractBuildOptions, PriceQuote};
use crate::service::error::ServiceError;
use crate::service::notification_service::NotificationService;
use crate::service::payment_service::PaymentService;
use crate::utils::password::{generate_temporary_password, hash_password};

#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    pub service_request: ServiceRequest,
    pub contract: Contract,
    pub payment: Option<Payment>,
}

/// Drives the Pending -> Scheduled transition and everything it triggers:
/// first-time customer onboarding, contract creation, the immediate charge
/// for one-time contracts, and best-effort notifications.
#[derive(Debug, Clone)]
pub struct ApprovalService {
    db_client: Arc<DBClient>,
    payment_service: Arc<PaymentService>,
    notifications: Arc<NotificationService>,
}

impl ApprovalService {
    pub fn new(
        db_client: Arc<DBClient>,
        payment_service: Arc<PaymentService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            payment_service,
            notifications,
        }
    }

    pub async fn approve(
        &self,
        request_id: Uuid,
        dto: &ApproveServiceRequestDto,
        approver_id: Uuid,
    ) -> Result<ApprovalOutcome, ServiceError> {
        // The conditional update is the transition guard: anything not
        // Pending comes back as no row and nothing has been mutated.
        let request = match self
            .db_client
            .mark_request_scheduled(request_id, dto.confirmed_price.as_ref())
            .await?
        {
            Some(request) => request,
            None => {
                // Re-read for the rejection reason; the status may have moved
                // between our read and the guarded update.
                let current = self
                    .db_client
                    .get_service_request(request_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Service request {}", request_id))
                    })?;

                return Err(match current.status {
                    ServiceRequestStatus::Scheduled => ServiceError::InvalidState(
                        "Service request is already approved".to_string(),
                    ),
                    status => ServiceError::InvalidState(format!(
                        "Cannot approve a service request in status {}",
                        status.to_str()
                    )),
                });
            }
        };

        tracing::info!(
            "Service request {} approved by admin {}",
            request.id,
            approver_id
        );

        let client = self
            .db_client
            .get_user(request.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {}", request.user_id)))?;

        let property = self
            .db_client
            .get_property(request.property_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Property {}", request.property_id)))?;

        let (client, temporary_password) = self.provision_first_time_customer(client).await?;

        if let Some(password) = &temporary_password {
            if let Err(error) = self.notifications.notify_welcome(&client, password).await {
                tracing::error!("Failed to send welcome email to {}: {}", client.email, error);
            }
        }

        let quote = self.assemble_price_quote(&request).await?;
        let options = ContractBuildOptions {
            admin_note: dto.admin_note.clone(),
            terms: dto.terms.clone(),
            scope: dto.scope.clone(),
            work_days: dto.work_days.clone(),
            work_start_time: dto.work_start_time,
            work_end_time: dto.work_end_time,
        };

        let draft = contract_factory::build(&request, &quote, &options)?;
        let contract = self.db_client.create_contract(&draft).await?;

        tracing::info!(
            "Contract {} created from service request {}",
            contract.contract_number,
            request.id
        );

        // One-time contracts are charged synchronously rather than waiting
        // for the next monitor tick. A charge failure is logged, never
        // unwinding the approval that already happened.
        let payment = if contract.payment_frequency == Frequency::OneTime {
            match self.payment_service.create_for_contract(&contract).await {
                Ok(payment) => Some(payment),
                Err(ServiceError::DuplicateObligation(_)) => None,
                Err(error) => {
                    tracing::error!(
                        "Failed to create immediate payment for contract {}: {}",
                        contract.contract_number,
                        error
                    );
                    None
                }
            }
        } else {
            None
        };

        let contract_sheet = render_contract_sheet(&contract, &client, &property);
        if let Err(error) = self
            .notifications
            .notify_contract_approved(&client, &contract, &property, &contract_sheet)
            .await
        {
            tracing::error!(
                "Failed to send contract email for {}: {}",
                contract.contract_number,
                error
            );
        }

        Ok(ApprovalOutcome {
            service_request: request,
            contract,
            payment,
        })
    }

    /// A client without a verified email has never signed in: generate
    /// credentials now so the welcome mail can carry them.
    async fn provision_first_time_customer(
        &self,
        client: User,
    ) -> Result<(User, Option<String>), ServiceError> {
        if client.email_verified {
            return Ok((client, None));
        }

        let password = generate_temporary_password();
        let password_hash = hash_password(&password)?;
        let updated = self
            .db_client
            .set_user_credentials(client.id, &password_hash)
            .await?;

        tracing::info!("Generated credentials for first-time customer {}", updated.email);
        Ok((updated, Some(password)))
    }

    async fn assemble_price_quote(
        &self,
        request: &ServiceRequest,
    ) -> Result<PriceQuote, ServiceError> {
        let service = self.db_client.get_service(request.service_id).await?;
        let product_total = self.db_client.product_line_total(request.id).await?;

        Ok(PriceQuote {
            actual: request.actual_price.clone(),
            recalculated: contract_factory::recalculated_price(
                service.as_ref(),
                request.estimated_duration_minutes,
                product_total,
            ),
            estimated: Some(request.estimated_price.clone()),
        })
    }
}
