//! Clinical transcript analysis: patient dialogue isolation, entity/QA summaries,
//! sentiment and intent annotation, and SOAP note generation.

pub mod api;
pub mod cli;
pub mod config;
pub mod export;
pub mod logging;
pub mod nlp;
pub mod soap;
pub mod transcript;
