pub mod career;
pub mod organization;
