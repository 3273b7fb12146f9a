//! Academic records service: students, professors, proctorships and
//! library memberships over HTTP.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
