use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

/// Exact, case-sensitive membership test against the configured allow-list
pub fn is_allowed(allow_list: &[String], name: &str) -> bool {
    allow_list.iter().any(|allowed| allowed == name)
}

/// One lock per allow-listed service, so a service never has two
/// start/stop commands in flight at once.
///
/// Built once at startup; the table itself is never mutated afterwards.
pub struct ServiceLocks {
    locks: HashMap<String, Mutex<()>>,
}

impl ServiceLocks {
    pub fn new(allow_list: &[String]) -> Self {
        let locks = allow_list
            .iter()
            .map(|name| (name.clone(), Mutex::new(())))
            .collect();

        Self { locks }
    }

    /// Block until `name` is free. Returns `None` for names outside the allow-list.
    pub fn acquire(&self, name: &str) -> Option<MutexGuard<'_, ()>> {
        let lock = self.locks.get(name)?;
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        Some(lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{mpsc, Arc},
        thread,
        time::Duration,
    };

    use super::*;

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matches_exact_names_only() {
        let allow = list(&["Spooler", "W32Time"]);

        assert!(is_allowed(&allow, "Spooler"));
        assert!(is_allowed(&allow, "W32Time"));
        assert!(!is_allowed(&allow, "spooler"));
        assert!(!is_allowed(&allow, "Spool"));
        assert!(!is_allowed(&allow, "Spooler "));
        assert!(!is_allowed(&allow, "*"));
        assert!(!is_allowed(&allow, ""));
    }

    #[test]
    fn empty_list_allows_nothing() {
        assert!(!is_allowed(&[], "Spooler"));
    }

    #[test]
    fn locks_exist_only_for_allowed_services() {
        let locks = ServiceLocks::new(&list(&["nginx", "nginx", "redis"]));

        assert!(locks.acquire("nginx").is_some());
        assert!(locks.acquire("redis").is_some());
        assert!(locks.acquire("postgres").is_none());
    }

    #[test]
    fn lock_is_released_when_guard_drops() {
        let locks = ServiceLocks::new(&list(&["nginx"]));

        let guard = locks.acquire("nginx").unwrap();
        drop(guard);
        assert!(locks.acquire("nginx").is_some());
    }

    #[test]
    fn different_services_do_not_block_each_other() {
        let locks = ServiceLocks::new(&list(&["nginx", "redis"]));

        let _nginx = locks.acquire("nginx").unwrap();
        assert!(locks.acquire("redis").is_some());
    }

    #[test]
    fn same_service_waits_for_the_holder() {
        let locks = Arc::new(ServiceLocks::new(&list(&["nginx"])));
        let guard = locks.acquire("nginx").unwrap();

        let (acquired_tx, acquired_rx) = mpsc::channel();
        let waiter = {
            let locks = Arc::clone(&locks);
            thread::spawn(move || {
                let _guard = locks.acquire("nginx").unwrap();
                acquired_tx.send(()).unwrap();
            })
        };

        assert!(acquired_rx.recv_timeout(Duration::from_millis(200)).is_err());

        drop(guard);
        assert!(acquired_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        waiter.join().unwrap();
    }
}
