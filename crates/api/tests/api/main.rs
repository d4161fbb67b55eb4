mod helpers;
mod query_service;
