pub mod accounts;
pub mod error;
pub mod flash;
pub mod health;
pub mod jobs;
pub mod pages;
pub mod routes;
pub mod state;
pub mod validation;
