use serde::Serialize;

use crate::domain::models::{application::Application, job::Job};

#[derive(Serialize)]
pub struct HireResponse {
    pub job: Job,
    pub application: Application,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub job_id: i64,
    pub count: i64,
}

#[derive(Serialize)]
pub struct ViewedResponse {
    pub application_id: i64,
    pub viewed: bool,
}

#[derive(Serialize)]
pub struct MarkedReadResponse {
    pub updated: u64,
}
