//! Background children waiting to be reaped.

use crate::command::ExitCode;
use crate::errors::ShellError;
use crate::external::exit_code;
use log::{trace, warn};
use std::process::Child;

/// A background process that has terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    pub pid: u32,
    pub code: ExitCode,
}

/// Children started with `&`.
///
/// They are polled without blocking; the interpreter calls [`Jobs::reap`] once
/// per prompt so that finished children never linger as zombies.
#[derive(Debug, Default)]
pub struct Jobs {
    children: Vec<Child>,
}

impl Jobs {
    pub fn track(&mut self, child: Child) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Collect every child that has exited since the last call.
    ///
    /// A child that cannot be polled stays in the table and is tried again on
    /// the next call; the failure is returned alongside the finished ones.
    pub fn reap(&mut self) -> Vec<Result<Finished, ShellError>> {
        let mut finished = Vec::new();
        self.children.retain_mut(|child| {
            let pid = child.id();
            match child.try_wait() {
                Ok(Some(status)) => {
                    finished.push(Ok(Finished {
                        pid,
                        code: exit_code(status),
                    }));
                    false
                }
                Ok(None) => true,
                Err(source) => {
                    warn!("cannot poll background process {}: {}", pid, source);
                    finished.push(Err(ShellError::Wait { pid, source }));
                    true
                }
            }
        });
        trace!("{} background jobs still running", self.children.len());
        finished
    }

    /// Block until every tracked child has exited.
    pub fn wait_all(&mut self) -> Vec<Finished> {
        self.children
            .drain(..)
            .filter_map(|mut child| {
                let pid = child.id();
                match child.wait() {
                    Ok(status) => Some(Finished {
                        pid,
                        code: exit_code(status),
                    }),
                    Err(e) => {
                        warn!("cannot wait for background process {}: {}", pid, e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::{Duration, Instant};

    fn spawn(script: &str) -> Child {
        Command::new("sh").args(["-c", script]).spawn().unwrap()
    }

    fn all_ok(results: Vec<Result<Finished, ShellError>>) -> Vec<Finished> {
        results.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    #[cfg(unix)]
    fn finished_children_are_reaped_once() {
        let mut jobs = Jobs::default();
        let child = spawn("exit 7");
        let pid = child.id();
        jobs.track(child);

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut finished = Vec::new();
        while finished.is_empty() && Instant::now() < deadline {
            finished = all_ok(jobs.reap());
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(finished, vec![Finished { pid, code: 7 }]);
        assert!(jobs.is_empty());
        assert!(jobs.reap().is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn running_children_are_kept() {
        let mut jobs = Jobs::default();
        jobs.track(spawn("sleep 5"));
        assert!(jobs.reap().is_empty());
        assert_eq!(jobs.len(), 1);

        for child in &mut jobs.children {
            child.kill().unwrap();
        }
        let finished = jobs.wait_all();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].code, 128 + 9);
        assert!(jobs.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn poll_failure_is_reported_and_child_is_kept() {
        let mut jobs = Jobs::default();
        let child = spawn("exit 0");
        let pid = child.id();
        // Reap the child behind the table's back so that polling it fails.
        let mut status = 0;
        let reaped = unsafe { libc::waitpid(pid as libc::pid_t, &mut status, 0) };
        assert_eq!(reaped, pid as libc::pid_t);
        jobs.track(child);

        let results = jobs.reap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(ShellError::Wait { pid: failed, .. }) => assert_eq!(*failed, pid),
            other => panic!("expected a poll failure, got {:?}", other),
        }
        assert_eq!(jobs.len(), 1);
        assert!(jobs.reap()[0].is_err());
    }
}
