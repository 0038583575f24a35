use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use hefesto_domain::procwatch::alert_result::AlertResult;
use hefesto_domain::procwatch::alert_rule::AlertRule;
#[cfg(test)]
use hefesto_domain::procwatch::alert_rule::{ComparisonOperator, MetricType, ThresholdUnit, WindowCondition};
use hefesto_domain::procwatch::process_sample::ProcessSample;

use super::process_monitor_service::{DumpType, ProcessMonitorService, TopMode};

/// What a monitoring run samples on each tick.
#[derive(Debug, Clone)]
pub enum MonitorTarget {
    Pid(u32),
    Name {
        name: String,
        match_filter: Option<String>,
    },
    Top { mode: TopMode, limit: usize },
}

/// Outcome of a single tick: the samples pulled and any triggered alerts,
/// paired one-to-one with the sample that produced them.
pub struct Tick {
    pub samples: Vec<ProcessSample>,
    pub alerts: Vec<AlertResult>,
    pub dumps: Vec<(u32, String)>,
}

/// Why a monitoring run ended without completing its requested tick count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    TargetMissing(String),
}

/// Drives the tick/sleep/alert loop shared by all three monitor target
/// modes (single pid, name pattern, top-N). Each call to `run` owns one
/// single-threaded timer loop: probe and listener calls are synchronous
/// within it, and a long sample extends the next tick rather than
/// overlapping with it.
///
/// Cancellation is cooperative via an `AtomicBool` checked at tick
/// boundaries and before each sleep, so a caller that shares the flag with
/// a signal handler can stop a run within one scheduling quantum.
pub struct MonitorOrchestrator<'a> {
    service: &'a mut ProcessMonitorService,
}

impl<'a> MonitorOrchestrator<'a> {
    pub fn new(service: &'a mut ProcessMonitorService) -> Self {
        Self { service }
    }

    /// Verifies the target resolves to at least one process before any
    /// tick runs, so the orchestrator never starts a monitor doomed to
    /// produce nothing.
    pub fn validate_target(&self, target: &MonitorTarget) -> Result<(), MonitorError> {
        match target {
            MonitorTarget::Pid(pid) => {
                if self.service.sample_by_pid(*pid).is_none() {
                    return Err(MonitorError::TargetMissing(format!(
                        "process not found: {pid}"
                    )));
                }
            }
            MonitorTarget::Name { name, match_filter } => {
                let samples = self.service.sample_by_name(name);
                let filtered = filter_by_match(&samples, match_filter.as_deref());
                if filtered.is_empty() {
                    return Err(MonitorError::TargetMissing(format!(
                        "no process matches name: {name}"
                    )));
                }
            }
            MonitorTarget::Top { .. } => {}
        }
        Ok(())
    }

    /// Runs the monitor to completion.
    ///
    /// `count = -1` runs forever (until cancelled); `count = 1` performs a
    /// single tick and returns without scheduling a sleep. `rules` are
    /// evaluated against every sample produced this tick; a triggered
    /// result that has `dump_type` configured synchronously invokes the
    /// external dump tool and reports its output alongside the alert.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        target: &MonitorTarget,
        interval: Duration,
        count: i32,
        rules: &[AlertRule],
        dump_type: Option<DumpType>,
        cancel: Option<&AtomicBool>,
        mut on_tick: impl FnMut(&Tick),
    ) {
        let mut ticks_done = 0;

        loop {
            if count >= 0 && ticks_done >= count {
                break;
            }
            if cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false) {
                break;
            }

            let samples = self.pull_samples(target);
            if samples.is_empty() {
                if matches!(target, MonitorTarget::Pid(_) | MonitorTarget::Name { .. }) {
                    // The target disappeared mid-run; stop rather than spin.
                    on_tick(&Tick {
                        samples: Vec::new(),
                        alerts: Vec::new(),
                        dumps: Vec::new(),
                    });
                    break;
                }
            }

            let mut alerts = Vec::new();
            let mut dumps = Vec::new();
            if !rules.is_empty() {
                for sample in &samples {
                    let results = self.service.evaluate_alerts(sample, rules);
                    for result in results {
                        if result.triggered {
                            if let Some(dt) = dump_type {
                                let dump = self.service.execute_dump_command(sample.pid, dt);
                                dumps.push((sample.pid, dump));
                            }
                        }
                        alerts.push(result);
                    }
                }
            }

            ticks_done += 1;
            on_tick(&Tick {
                samples,
                alerts,
                dumps,
            });

            let is_last = count >= 0 && ticks_done >= count;
            if !is_last {
                if cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false) {
                    break;
                }
                thread::sleep(interval);
            }
        }

        self.service.clear_alert_history();
    }

    fn pull_samples(&self, target: &MonitorTarget) -> Vec<ProcessSample> {
        match target {
            MonitorTarget::Pid(pid) => self
                .service
                .sample_by_pid(*pid)
                .map(|s| vec![s])
                .unwrap_or_default(),
            MonitorTarget::Name { name, match_filter } => {
                let samples = self.service.sample_by_name(name);
                filter_by_match(&samples, match_filter.as_deref())
            }
            MonitorTarget::Top { mode, limit } => match mode {
                TopMode::Cpu => self.service.top_by_cpu(*limit),
                TopMode::Memory => self.service.top_by_memory(*limit),
            },
        }
    }
}

fn filter_by_match(samples: &[ProcessSample], match_str: Option<&str>) -> Vec<ProcessSample> {
    match match_str {
        None | Some("") => samples.to_vec(),
        Some(m) => {
            let lower = m.to_lowercase();
            samples
                .iter()
                .filter(|s| s.command_line.to_lowercase().contains(&lower))
                .cloned()
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hefesto_platform::process_sampler::ProcessSampler;
    use std::sync::Arc;

    struct FakeSampler {
        samples: Vec<ProcessSample>,
    }

    impl ProcessSampler for FakeSampler {
        fn get_all_processes(&self) -> anyhow::Result<Vec<ProcessSample>> {
            Ok(self.samples.clone())
        }

        fn sample_by_pid(&self, pid: u32) -> anyhow::Result<Option<ProcessSample>> {
            Ok(self.samples.iter().find(|s| s.pid == pid).cloned())
        }

        fn sample_by_name(&self, name: &str) -> anyhow::Result<Vec<ProcessSample>> {
            let lower = name.to_lowercase();
            Ok(self
                .samples
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&lower))
                .cloned()
                .collect())
        }

        fn top_by_cpu(&self, limit: usize) -> anyhow::Result<Vec<ProcessSample>> {
            let mut sorted = self.samples.clone();
            sorted.sort_by(|a, b| {
                b.cpu
                    .percent_instant
                    .partial_cmp(&a.cpu.percent_instant)
                    .unwrap()
            });
            sorted.truncate(limit);
            Ok(sorted)
        }

        fn top_by_memory(&self, limit: usize) -> anyhow::Result<Vec<ProcessSample>> {
            let mut sorted = self.samples.clone();
            sorted.sort_by(|a, b| b.memory.rss_bytes.cmp(&a.memory.rss_bytes));
            sorted.truncate(limit);
            Ok(sorted)
        }
    }

    #[test]
    fn test_validate_target_missing_pid() {
        let sampler = Arc::new(FakeSampler { samples: vec![] });
        let mut service = ProcessMonitorService::new(sampler);
        let orchestrator = MonitorOrchestrator::new(&mut service);
        let err = orchestrator
            .validate_target(&MonitorTarget::Pid(999))
            .unwrap_err();
        assert_eq!(err, MonitorError::TargetMissing("process not found: 999".to_string()));
    }

    #[test]
    fn test_validate_target_present_pid() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "proc", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);
        let orchestrator = MonitorOrchestrator::new(&mut service);
        assert!(orchestrator.validate_target(&MonitorTarget::Pid(1)).is_ok());
    }

    #[test]
    fn test_run_single_shot_invokes_once() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "proc", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);
        let mut orchestrator = MonitorOrchestrator::new(&mut service);

        let mut tick_count = 0;
        orchestrator.run(
            &MonitorTarget::Pid(1),
            Duration::from_millis(1),
            1,
            &[],
            None,
            None,
            |tick| {
                tick_count += 1;
                assert_eq!(tick.samples.len(), 1);
            },
        );

        assert_eq!(tick_count, 1);
    }

    #[test]
    fn test_run_bounded_count_runs_exactly_n_times() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "proc", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);
        let mut orchestrator = MonitorOrchestrator::new(&mut service);

        let mut tick_count = 0;
        orchestrator.run(
            &MonitorTarget::Pid(1),
            Duration::from_millis(1),
            3,
            &[],
            None,
            None,
            |_tick| tick_count += 1,
        );

        assert_eq!(tick_count, 3);
    }

    #[test]
    fn test_run_cancel_stops_before_count_reached() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "proc", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);
        let mut orchestrator = MonitorOrchestrator::new(&mut service);
        let cancel = AtomicBool::new(false);

        let mut tick_count = 0;
        orchestrator.run(
            &MonitorTarget::Pid(1),
            Duration::from_millis(1),
            -1,
            &[],
            None,
            Some(&cancel),
            |_tick| {
                tick_count += 1;
                if tick_count >= 2 {
                    cancel.store(true, Ordering::Relaxed);
                }
            },
        );

        assert_eq!(tick_count, 2);
    }

    #[test]
    fn test_run_name_target_applies_match_filter() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "java", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);
        let mut orchestrator = MonitorOrchestrator::new(&mut service);

        let target = MonitorTarget::Name {
            name: "java".to_string(),
            match_filter: Some("nonexistent".to_string()),
        };
        assert!(orchestrator.validate_target(&target).is_err());
    }

    #[test]
    fn test_run_clears_alert_history_on_every_exit_path() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "proc", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);

        let rule = AlertRule {
            expression: "cpu>0 for 50ms".to_string(),
            metric: MetricType::Cpu,
            operator: ComparisonOperator::GreaterEq,
            threshold: 0.0,
            unit: ThresholdUnit::Percent,
            window: Some(Duration::from_millis(50)),
            window_condition: Some(WindowCondition::For),
        };

        // First run: the condition holds from tick one, but not long enough
        // to clear the 50ms window, so it must not trigger yet.
        {
            let mut orchestrator = MonitorOrchestrator::new(&mut service);
            let mut triggered = false;
            orchestrator.run(
                &MonitorTarget::Pid(1),
                Duration::from_millis(1),
                1,
                &[rule.clone()],
                None,
                None,
                |tick| triggered = tick.alerts.iter().any(|a| a.triggered),
            );
            assert!(!triggered, "rule should not trigger on its very first tick");
        }

        thread::sleep(Duration::from_millis(60));

        // Second run: if the first run's trigger-start timer had survived,
        // more than 50ms would already have elapsed by this tick and the
        // rule would fire immediately instead of starting its window over.
        {
            let mut orchestrator = MonitorOrchestrator::new(&mut service);
            let mut triggered = false;
            orchestrator.run(
                &MonitorTarget::Pid(1),
                Duration::from_millis(1),
                1,
                &[rule],
                None,
                None,
                |tick| triggered = tick.alerts.iter().any(|a| a.triggered),
            );
            assert!(
                !triggered,
                "stopping the monitor must clear alert history so a later run starts its window fresh"
            );
        }
    }

    #[test]
    fn test_run_stops_when_pid_disappears() {
        let sampler = Arc::new(FakeSampler {
            samples: vec![ProcessSample::minimal(1, "proc", "user")],
        });
        let mut service = ProcessMonitorService::new(sampler);
        let mut orchestrator = MonitorOrchestrator::new(&mut service);

        let mut tick_count = 0;
        orchestrator.run(
            &MonitorTarget::Pid(404),
            Duration::from_millis(1),
            -1,
            &[],
            None,
            None,
            |_tick| tick_count += 1,
        );

        assert_eq!(tick_count, 1);
    }
}
