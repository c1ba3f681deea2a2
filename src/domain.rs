pub mod builders;
pub mod entities;
pub mod use_cases;
