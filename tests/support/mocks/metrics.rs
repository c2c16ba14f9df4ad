// tests/support/mocks/metrics.rs
use oauth_authority::application::ports::metrics::MetricsRecorder;
use oauth_authority::domain::{ClientId, GrantType};
use std::{sync::Mutex, time::Duration};

#[derive(Debug, Default)]
pub struct RecordingMetrics {
    issued: Mutex<Vec<(String, GrantType)>>,
    validations: Mutex<Vec<bool>>,
    cache_lookups: Mutex<Vec<(&'static str, bool)>>,
    storage_errors: Mutex<Vec<&'static str>>,
}

impl RecordingMetrics {
    pub fn issued(&self) -> Vec<(String, GrantType)> {
        self.issued.lock().unwrap().clone()
    }

    pub fn validations(&self) -> Vec<bool> {
        self.validations.lock().unwrap().clone()
    }

    pub fn cache_lookups(&self) -> Vec<(&'static str, bool)> {
        self.cache_lookups.lock().unwrap().clone()
    }

    pub fn storage_errors(&self) -> Vec<&'static str> {
        self.storage_errors.lock().unwrap().clone()
    }
}

impl MetricsRecorder for RecordingMetrics {
    fn record_token_issued(&self, client_id: &ClientId, grant_type: GrantType, _: Duration) {
        self.issued
            .lock()
            .unwrap()
            .push((client_id.as_str().to_owned(), grant_type));
    }

    fn record_token_validation(&self, valid: bool, _: Duration) {
        self.validations.lock().unwrap().push(valid);
    }

    fn record_cache_lookup(&self, entity: &'static str, hit: bool) {
        self.cache_lookups.lock().unwrap().push((entity, hit));
    }

    fn record_storage_error(&self, operation: &'static str) {
        self.storage_errors.lock().unwrap().push(operation);
    }
}
