pub mod contractmodel;
pub mod paymentmodel;
pub mod propertymodel;
pub mod servicemodel;
pub mod servicerequestmodel;
pub mod usermodel;
pub mod visitmodel;
