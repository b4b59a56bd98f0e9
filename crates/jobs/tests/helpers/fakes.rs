//! Fakes for the application ports, shared across `tests/*.rs` in this
//! crate (mirrors `crates/jobs/tests/helpers/` in the teacher).

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use autofilter_application::ports::{
    BotStorePort, LogSource, ReloadSignalPort, ReverseDnsOutcome, ReverseDnsPort,
};
use autofilter_domain::{AutofilterError, BotSet};
use tokio_util::sync::CancellationToken;

pub struct ScriptedLogSource {
    pub lines: VecDeque<String>,
}

impl ScriptedLogSource {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into(),
        }
    }
}

#[async_trait]
impl LogSource for ScriptedLogSource {
    async fn next_line(
        &mut self,
        _shutdown: &CancellationToken,
    ) -> Result<Option<String>, AutofilterError> {
        Ok(self.lines.pop_front())
    }
}

pub struct AlwaysUnverified;

#[async_trait]
impl ReverseDnsPort for AlwaysUnverified {
    async fn verify(&self, _address: IpAddr) -> ReverseDnsOutcome {
        ReverseDnsOutcome::Unverified
    }
}

pub struct InMemoryBotStore {
    pub set: Mutex<BotSet>,
}

impl InMemoryBotStore {
    pub fn empty() -> Self {
        Self {
            set: Mutex::new(BotSet::new()),
        }
    }

    pub fn snapshot(&self) -> BotSet {
        self.set.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotStorePort for InMemoryBotStore {
    async fn load(&self, now: i64) -> Result<BotSet, AutofilterError> {
        let mut set = self.set.lock().unwrap().clone();
        set.expire(now);
        Ok(set)
    }

    async fn persist(&self, set: &BotSet) -> Result<(), AutofilterError> {
        *self.set.lock().unwrap() = set.clone();
        Ok(())
    }
}

pub struct AlwaysSignal;

#[async_trait]
impl ReloadSignalPort for AlwaysSignal {
    async fn signal(&self) -> Result<bool, AutofilterError> {
        Ok(true)
    }
}

pub fn line(addr: &str, country: &str, uri: &str, time: &str) -> String {
    format!("{time}\t{country}\t{addr}\tHIT\t0.002\t200\thttps\texample.com\tGET\t{uri}\t512\t-\t-")
}
