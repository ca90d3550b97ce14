/*!
 * Mock status fetcher for testing
 *
 * Replaces the HTTP client so that no test reaches the network. Every URL
 * can be given a script of statuses; the last one repeats once the script
 * is exhausted. Unscripted URLs answer with the default status.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use locheck::checks::StatusFetcher;

#[derive(Debug)]
pub struct MockFetcher {
    scripts: Mutex<HashMap<String, Vec<u16>>>,
    calls: Mutex<Vec<String>>,
    default_status: u16,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Every URL answers 200
    pub fn new() -> Self {
        Self::with_default(200)
    }

    pub fn with_default(default_status: u16) -> Self {
        MockFetcher {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            default_status,
        }
    }

    /// Answer `url` with `statuses`, one per attempt
    pub fn script(self, url: &str, statuses: &[u16]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), statuses.to_vec());
        self
    }

    /// Number of requests issued for `url`
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    /// Total number of requests issued
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every requested URL, in request order
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusFetcher for MockFetcher {
    async fn fetch_status(&self, url: &str) -> u16 {
        self.calls.lock().unwrap().push(url.to_string());
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(url) {
            Some(statuses) if statuses.len() > 1 => statuses.remove(0),
            Some(statuses) => statuses.first().copied().unwrap_or(self.default_status),
            None => self.default_status,
        }
    }
}
