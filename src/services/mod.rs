pub mod catalog_service;
pub mod identity_service;
pub mod order_service;
pub mod report_service;
