use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;

/// A permit that holds both global and per-host semaphore permits.
pub struct ThrottlePermit {
    _global: OwnedSemaphorePermit,
    _host: OwnedSemaphorePermit,
}

/// Caller-owned rate-limit gate placed in front of the header source.
pub struct Throttle {
    global: Arc<Semaphore>,
    per_host: Arc<DashMap<String, Arc<Semaphore>>>,
    default_per_host: usize,
}

impl Throttle {
    pub fn new(global_limit: usize, default_per_host: usize) -> Self {
        Self {
            global: Arc::new(Semaphore::new(global_limit.max(1))),
            per_host: Arc::new(DashMap::new()),
            default_per_host: default_per_host.max(1),
        }
    }

    /// Reduce a host's limit for `cooldown_secs`, then restore the default.
    pub fn cool_down_host(&self, host: &str, new_limit: usize, cooldown_secs: u64) {
        let host_name = host.to_string();
        let per_host = self.per_host.clone();
        let default = self.default_per_host;
        per_host.insert(host_name.clone(), Arc::new(Semaphore::new(new_limit.max(1))));

        tokio::spawn(async move {
            sleep(Duration::from_secs(cooldown_secs)).await;
            per_host.insert(host_name, Arc::new(Semaphore::new(default)));
        });
    }

    fn host_semaphore(&self, host: &str) -> Arc<Semaphore> {
        self.per_host
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.default_per_host)))
            .value()
            .clone()
    }

    pub fn available_for(&self, host: &str) -> usize {
        self.host_semaphore(host).available_permits()
    }

    /// Acquire global then host permits; both are released on drop.
    pub async fn acquire(&self, host: &str) -> Result<ThrottlePermit, AcquireError> {
        let global = self.global.clone().acquire_owned().await?;
        let host = self.host_semaphore(host).acquire_owned().await?;
        Ok(ThrottlePermit { _global: global, _host: host })
    }
}
