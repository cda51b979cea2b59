pub mod contractdb;
pub mod db;
pub mod paymentdb;
pub mod propertydb;
pub mod servicedb;
pub mod servicerequestdb;
pub mod userdb;
pub mod visitdb;
