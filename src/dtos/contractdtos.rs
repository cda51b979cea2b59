use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct CancelContractDto {
    #[validate(length(max = 2000, message = "Reason must be at most 2000 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContractQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}
