use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use regex::Regex;

use hefesto_domain::command::{CommandInfo, CommandResult, Documentation, ExampleDoc, OptionDoc};
use hefesto_domain::command_parser;
use hefesto_domain::config::HefestoConfig;
use hefesto_domain::procwatch::alert_rule::AlertRule;
use hefesto_domain::procwatch::jvm_metrics::JvmMetrics;
use hefesto_domain::procwatch::process_sample::ProcessSample;
use hefesto_platform::process_sampler::ProcessSampler;

use crate::command::Command;
use crate::context::ExecutionContext;
use crate::feature::portinfo::service::jvm_metrics_service::JvmMetricsService;
use crate::port::OutputPort;

use super::service::alert_parser::{AlertParser, AlertParserError};
use super::service::monitor_orchestrator::{MonitorOrchestrator, MonitorTarget, Tick};
use super::service::process_monitor_service::{DumpType, ProcessMonitorService, TopMode};

/// Time format for log lines: HH:MM:SS.
const TIME_FORMAT: &str = "%H:%M:%S";

/// Command for monitoring processes -- CPU, RAM, threads, file descriptors, I/O.
/// Supports alerts with a mini DSL and optional diagnostic dumps.
pub struct ProcWatchCommand {
    info: CommandInfo,
    sampler: Arc<dyn ProcessSampler>,
    alert_parser: AlertParser,
    jvm_metrics: JvmMetricsService,
}

impl ProcWatchCommand {
    /// Creates a new `ProcWatchCommand` backed by the given process sampler.
    pub fn new(sampler: Arc<dyn ProcessSampler>) -> Self {
        let info = CommandInfo::new(
            "proc-watch",
            "Monitor de procesos (CPU/RAM/threads/FD/IO) con alertas",
        )
        .with_category("system".to_string())
        .with_aliases(vec!["pw".into(), "pwatch".into(), "procmon".into()])
        .with_documentation(build_documentation());

        Self {
            info,
            sampler,
            alert_parser: AlertParser::new(),
            jvm_metrics: JvmMetricsService::new(),
        }
    }
}

impl Command for ProcWatchCommand {
    fn info(&self) -> &CommandInfo {
        &self.info
    }

    fn execute(&self, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
        let parsed = command_parser::parse(args);
        let output = &ctx.output;
        let config = ctx.config;

        // ── Help for alert syntax ──────────────────────────────────────
        if parsed.get_boolean("list-alerts") {
            output.println(AlertParser::syntax_help());
            output.flush();
            return CommandResult::success();
        }

        // ── Output format flags ────────────────────────────────────────
        let json = parsed.get_boolean("json") || parsed.get_boolean("j");
        let jsonl = parsed.get_boolean("jsonl");
        let compact = parsed.get_boolean("compact");
        let quiet = parsed.get_boolean("quiet") || parsed.get_boolean("q");
        let once = parsed.get_boolean("once");

        // ── Interval ───────────────────────────────────────────────────
        let interval_str = parsed
            .get_flag("interval")
            .or_else(|| parsed.get_flag("i"))
            .unwrap_or("1s");
        let interval = parse_interval(interval_str);

        // ── Count ──────────────────────────────────────────────────────
        let mut count: i32 = parsed
            .get_flag_as_int("count")
            .or_else(|| parsed.get_flag_as_int("c"))
            .unwrap_or(-1);
        if once {
            count = 1;
        }

        // ── Top-mode limit ─────────────────────────────────────────────
        let limit = parsed
            .get_flag_as_int("limit")
            .or_else(|| parsed.get_flag_as_int("l"))
            .unwrap_or(config.default_top_limit as i32) as usize;

        // ── Alert rules ────────────────────────────────────────────────
        // A batch with any invalid expression is rejected wholesale at
        // setup time; the monitor never starts with a silently shortened
        // rule set.
        let alert_expressions = collect_alert_expressions(&parsed);
        let alerts = match parse_alert_expressions(&alert_expressions, &self.alert_parser) {
            Ok(rules) => rules,
            Err(errors) => {
                for e in &errors {
                    output.print_error(&e.to_string());
                }
                output.flush();
                return CommandResult::failure(format!(
                    "{} regla(s) de alerta invalida(s)",
                    errors.len()
                ));
            }
        };

        // ── Dump on breach ─────────────────────────────────────────────
        let dump_type = parsed.get_flag("dump-on-breach").and_then(parse_dump_type);

        // ── JVM metrics enrichment ──────────────────────────────────────
        let jvm = parsed.get_boolean("jvm");

        // ── Build the service ──────────────────────────────────────────
        let mut service = ProcessMonitorService::with_alert_history(
            Arc::clone(&self.sampler),
            config.alert_history_duration(),
        );

        // ── Mode: Top ──────────────────────────────────────────────────
        if parsed.has_flag("top") || parsed.has_flag("t") {
            let mode_str = parsed
                .get_flag("top")
                .or_else(|| parsed.get_flag("t"))
                .unwrap_or("cpu");

            let mode = match mode_str.to_lowercase().as_str() {
                "cpu" | "c" => TopMode::Cpu,
                "mem" | "memory" | "m" => TopMode::Memory,
                other => return CommandResult::failure(format!("Modo desconocido: {other}")),
            };

            return handle_top_mode(
                output.as_ref(),
                &mut service,
                config,
                mode,
                limit,
                interval,
                count,
                json,
                jsonl,
                compact,
            );
        }

        // ── Mode: By PID ──────────────────────────────────────────────
        if parsed.has_flag("pid") || parsed.has_flag("p") {
            let pid_str = match parsed.get_flag("pid").or_else(|| parsed.get_flag("p")) {
                Some(s) => s,
                None => return CommandResult::failure("Se requiere un PID valido"),
            };

            let pid: u32 = match pid_str.parse() {
                Ok(v) => v,
                Err(_) => return CommandResult::failure(format!("PID invalido: {pid_str}")),
            };

            return handle_pid_mode(
                output.as_ref(),
                &mut service,
                &self.jvm_metrics,
                pid,
                interval,
                count,
                &alerts,
                dump_type,
                jvm,
                json,
                jsonl,
                compact,
                quiet,
            );
        }

        // ── Mode: By Name ─────────────────────────────────────────────
        if parsed.has_flag("name") || parsed.has_flag("n") {
            let name = match parsed.get_flag("name").or_else(|| parsed.get_flag("n")) {
                Some(s) => s,
                None => return CommandResult::failure("Se requiere un nombre de proceso"),
            };

            let match_filter = parsed.get_flag("match").or_else(|| parsed.get_flag("m"));

            return handle_name_mode(
                output.as_ref(),
                &mut service,
                name,
                match_filter,
                interval,
                count,
                &alerts,
                dump_type,
                json,
                jsonl,
                compact,
                quiet,
            );
        }

        // ── No target specified ────────────────────────────────────────
        output.print_error("Debe especificar --pid, --name o --top");
        output.println("\nUso: proc-watch --pid <PID>");
        output.println("     proc-watch --name <proceso>");
        output.println("     proc-watch --top cpu|memory");
        output.println("\nEjecute 'proc-watch --help' para mas informacion");
        output.flush();
        CommandResult::failure("Falta especificar objetivo")
    }
}

// ════════════════════════════════════════════════════════════════════════
//  Mode handlers
// ════════════════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
fn handle_top_mode(
    output: &dyn OutputPort,
    service: &mut ProcessMonitorService,
    config: &HefestoConfig,
    top_mode: TopMode,
    limit: usize,
    interval: Duration,
    count: i32,
    json: bool,
    jsonl: bool,
    compact: bool,
) -> CommandResult {
    if !json && !jsonl && count != 1 {
        output.println("Presione Ctrl+C para detener");
        output.flush();
    }

    let target = MonitorTarget::Top {
        mode: top_mode,
        limit,
    };
    let mut orchestrator = MonitorOrchestrator::new(service);

    orchestrator.run(&target, interval, count, &[], None, None, |tick: &Tick| {
        if tick.samples.is_empty() {
            output.print_warning("No se encontraron procesos");
        } else if json {
            output.println(&format_top_json(&tick.samples));
        } else if jsonl {
            output.println(&format_top_jsonl(&tick.samples));
        } else if compact {
            clear_screen(output);
            output.println(&format_top_compact(&tick.samples, top_mode));
        } else {
            clear_screen(output);
            output.println(&format_top_table(&tick.samples, top_mode, config));
        }
        output.flush();
    });

    CommandResult::success()
}

#[allow(clippy::too_many_arguments)]
fn handle_pid_mode(
    output: &dyn OutputPort,
    service: &mut ProcessMonitorService,
    jvm_metrics: &JvmMetricsService,
    pid: u32,
    interval: Duration,
    count: i32,
    alerts: &[AlertRule],
    dump_type: Option<DumpType>,
    jvm: bool,
    json: bool,
    jsonl: bool,
    compact: bool,
    quiet: bool,
) -> CommandResult {
    let target = MonitorTarget::Pid(pid);
    let mut orchestrator = MonitorOrchestrator::new(service);
    if let Err(e) = orchestrator.validate_target(&target) {
        return CommandResult::failure(translate_monitor_error(&e));
    }

    if !quiet && !json && !jsonl && count != 1 {
        output.println(&format!(
            "Monitoreando PID {pid} - Presione Ctrl+C para detener"
        ));
        output.flush();
    }

    orchestrator.run(
        &target,
        interval,
        count,
        alerts,
        dump_type,
        None,
        |tick: &Tick| {
            if tick.samples.is_empty() {
                output.print_warning(&format!("Proceso {pid} ya no existe"));
                output.flush();
                return;
            }
            let sample = &tick.samples[0];

            if !quiet {
                if count == 1 {
                    if json || jsonl {
                        output.println(&format_sample_json(sample));
                    } else {
                        output.println(&format_sample_detailed(sample));
                        if jvm {
                            print_jvm_section(output, jvm_metrics, sample);
                        }
                    }
                } else if json {
                    output.println(&format_sample_json(sample));
                } else if jsonl {
                    output.println(&format_sample_jsonl(sample));
                } else if compact {
                    output.println(&format_sample_compact(sample));
                } else {
                    output.println(&format_sample_line(sample));
                }
                output.flush();
            }

            for result in &tick.alerts {
                if result.triggered {
                    output.print_warning(&result.message);
                    output.flush();
                }
            }
            for (dumped_pid, dump) in &tick.dumps {
                output.println(&format!("Dump de PID {dumped_pid}:"));
                output.println(dump);
                output.flush();
            }
        },
    );

    CommandResult::success()
}

#[allow(clippy::too_many_arguments)]
fn handle_name_mode(
    output: &dyn OutputPort,
    service: &mut ProcessMonitorService,
    name: &str,
    match_filter: Option<&str>,
    interval: Duration,
    count: i32,
    alerts: &[AlertRule],
    dump_type: Option<DumpType>,
    json: bool,
    jsonl: bool,
    compact: bool,
    quiet: bool,
) -> CommandResult {
    let target = MonitorTarget::Name {
        name: name.to_string(),
        match_filter: match_filter.map(|s| s.to_string()),
    };
    let mut orchestrator = MonitorOrchestrator::new(service);
    if let Err(e) = orchestrator.validate_target(&target) {
        return CommandResult::failure(translate_monitor_error(&e));
    }

    if !quiet && !json && !jsonl && count != 1 {
        output.println(&format!(
            "Monitoreando procesos '{name}' - Presione Ctrl+C para detener"
        ));
        output.flush();
    }

    orchestrator.run(
        &target,
        interval,
        count,
        alerts,
        dump_type,
        None,
        |tick: &Tick| {
            if tick.samples.is_empty() {
                output.print_warning(&format!("No se encontraron procesos con nombre: {name}"));
                output.flush();
                return;
            }

            if count == 1 {
                if json || jsonl {
                    output.println(&format_multiple_samples_json(&tick.samples));
                } else {
                    for sample in &tick.samples {
                        output.println(&format_sample_detailed(sample));
                        output.println("");
                    }
                }
            } else if !quiet {
                for sample in &tick.samples {
                    if json {
                        output.println(&format_sample_json(sample));
                    } else if jsonl {
                        output.println(&format_sample_jsonl(sample));
                    } else if compact {
                        output.println(&format_sample_compact(sample));
                    } else {
                        output.println(&format_sample_line(sample));
                    }
                }
            }

            for result in &tick.alerts {
                if result.triggered {
                    output.print_warning(&result.message);
                }
            }
            for (dumped_pid, dump) in &tick.dumps {
                output.println(&format!("Dump de PID {dumped_pid}:"));
                output.println(dump);
            }
            output.flush();
        },
    );

    CommandResult::success()
}

fn translate_monitor_error(e: &super::service::monitor_orchestrator::MonitorError) -> String {
    match e {
        super::service::monitor_orchestrator::MonitorError::TargetMissing(msg) => msg.clone(),
    }
}

/// Prints a JVM metrics section for a sample identified as a Java process.
/// Silently does nothing when the process isn't Java or no management
/// endpoint could be reached -- enrichment unavailability is never an error.
fn print_jvm_section(output: &dyn OutputPort, jvm_metrics: &JvmMetricsService, sample: &ProcessSample) {
    if !JvmMetricsService::is_java_process(&sample.command_line) {
        return;
    }
    match jvm_metrics.collect(sample.pid) {
        Some(metrics) => {
            output.println("");
            output.println(&format_jvm_metrics(&metrics));
        }
        None => {
            output.println("");
            output.println("  JVM: enriquecimiento no disponible");
        }
    }
}

fn format_jvm_metrics(m: &JvmMetrics) -> String {
    let mut sb = String::with_capacity(256);
    sb.push_str("  JVM:\n");
    sb.push_str(&format!("    VM:       {} {}\n", m.vm_name, m.vm_version));
    sb.push_str(&format!(
        "    Heap:     {} / {} ({:.1}%)\n",
        m.heap_used_formatted(),
        m.heap_max_formatted(),
        m.heap_usage_percent()
    ));
    sb.push_str(&format!(
        "    Threads:  {} (daemon: {}, deadlocked: {})\n",
        m.thread_count, m.daemon_thread_count, m.deadlocked_thread_count
    ));
    sb.push_str(&format!("    Uptime:   {}\n", m.uptime_formatted()));
    sb
}

// ════════════════════════════════════════════════════════════════════════
//  Parsing helpers
// ════════════════════════════════════════════════════════════════════════

/// Parses a human-readable interval string such as `"1s"`, `"500ms"`, `"5m"`, `"1h"`.
fn parse_interval(input: &str) -> Duration {
    // Pattern: digits followed by an optional unit suffix.
    let re = Regex::new(r"^(\d+)(ms|s|m|h)?$").expect("Invalid interval regex");
    match re.captures(input) {
        Some(caps) => {
            let value: u64 = caps[1].parse().unwrap_or(1);
            let unit = caps.get(2).map_or("s", |m| m.as_str());

            match unit {
                "ms" => Duration::from_millis(value),
                "s" => Duration::from_secs(value),
                "m" => Duration::from_secs(value * 60),
                "h" => Duration::from_secs(value * 3600),
                _ => Duration::from_secs(value),
            }
        }
        None => Duration::from_secs(1),
    }
}

/// Extracts every `--alert` / `-a` occurrence, in the order given on the
/// command line. `--alert` may be repeated to register multiple rules, so
/// this reads `repeated` rather than the single-valued `flags` map.
fn collect_alert_expressions(parsed: &command_parser::ParsedArgs) -> Vec<String> {
    let mut expressions: Vec<String> = parsed.get_all_flags("alert").to_vec();
    expressions.extend(parsed.get_all_flags("a").iter().cloned());
    expressions
}

/// Parses a batch of alert expressions, rejecting the whole batch if any
/// expression is invalid rather than silently dropping the bad ones.
fn parse_alert_expressions(
    expressions: &[String],
    alert_parser: &AlertParser,
) -> Result<Vec<AlertRule>, Vec<AlertParserError>> {
    let mut rules = Vec::with_capacity(expressions.len());
    let mut errors = Vec::new();

    for expr in expressions {
        match alert_parser.parse(expr) {
            Ok(rule) => rules.push(rule),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(rules)
    } else {
        Err(errors)
    }
}

/// Parses a dump-type string into a `DumpType` variant.
fn parse_dump_type(s: &str) -> Option<DumpType> {
    match s.to_lowercase().as_str() {
        "lsof" => Some(DumpType::Lsof),
        "pstack" => Some(DumpType::Pstack),
        "jstack" => Some(DumpType::Jstack),
        "jmap" => Some(DumpType::Jmap),
        _ => None,
    }
}

// ════════════════════════════════════════════════════════════════════════
//  Screen helpers
// ════════════════════════════════════════════════════════════════════════

/// Clears the terminal screen if possible, otherwise prints a separator.
fn clear_screen(output: &dyn OutputPort) {
    // In a CLI piped through Gradle or non-interactive terminals,
    // ANSI escape sequences may not work. Use a separator instead.
    output.println(&format!("\n{}", "=".repeat(90)));
}

// ════════════════════════════════════════════════════════════════════════
//  Formatting: Top mode
// ════════════════════════════════════════════════════════════════════════

fn format_top_table(samples: &[ProcessSample], mode: TopMode, config: &HefestoConfig) -> String {
    let now = Local::now().format(TIME_FORMAT);
    let mut sb = String::with_capacity(2048);

    sb.push_str(&format!(
        "TOP PROCESOS POR {} - {}\n",
        if mode == TopMode::Cpu {
            "CPU"
        } else {
            "MEMORIA"
        },
        now,
    ));
    sb.push_str(&"-".repeat(90));
    sb.push('\n');
    sb.push_str(&format!(
        "{:<8} {:<20} {:<8} {:<10} {:<10} {:<8} {}\n",
        "PID", "NOMBRE", "CPU%", "RSS", "VIRTUAL", "THREADS", "COMANDO"
    ));
    sb.push_str(&"-".repeat(90));
    sb.push('\n');

    for s in samples {
        sb.push_str(&format!(
            "{:<8} {:<20} {:>7.1}% {:<10} {:<10} {:>8} {}\n",
            s.pid,
            config.truncate_process_name(&s.name),
            s.cpu.percent_instant,
            s.memory.rss_formatted(),
            s.memory.virtual_formatted(),
            s.thread_count,
            config.truncate_command(&s.command_line),
        ));
    }

    sb
}

fn format_top_compact(samples: &[ProcessSample], mode: TopMode) -> String {
    let now = Local::now().format(TIME_FORMAT);
    let mut sb = format!("TOP {mode} @ {now}: ");

    let display_count = std::cmp::min(5, samples.len());
    for s in &samples[..display_count] {
        if mode == TopMode::Cpu {
            sb.push_str(&format!("{}({:.1}%) ", s.name, s.cpu.percent_instant));
        } else {
            sb.push_str(&format!("{}({}) ", s.name, s.memory.rss_formatted()));
        }
    }

    sb
}

fn format_top_json(samples: &[ProcessSample]) -> String {
    let now = Local::now().format(TIME_FORMAT);
    let mut sb = String::with_capacity(4096);
    sb.push_str(&format!("{{\"timestamp\":\"{now}\",\"processes\":["));

    for (i, s) in samples.iter().enumerate() {
        if i > 0 {
            sb.push(',');
        }
        sb.push_str(&format_sample_json(s));
    }

    sb.push_str("]}");
    sb
}

fn format_top_jsonl(samples: &[ProcessSample]) -> String {
    samples
        .iter()
        .map(format_sample_jsonl)
        .collect::<Vec<_>>()
        .join("\n")
}

// ════════════════════════════════════════════════════════════════════════
//  Formatting: Single sample
// ════════════════════════════════════════════════════════════════════════

fn format_sample_line(s: &ProcessSample) -> String {
    let now = Local::now().format(TIME_FORMAT);
    format!(
        "[{now}] PID={} {} CPU={:.1}% RSS={} VSZ={} THR={} FD={}",
        s.pid,
        s.name,
        s.cpu.percent_instant,
        s.memory.rss_formatted(),
        s.memory.virtual_formatted(),
        s.thread_count,
        s.open_file_descriptors,
    )
}

fn format_sample_compact(s: &ProcessSample) -> String {
    format!(
        "{}|{}|{:.1}%|{}|{}|{}",
        s.pid,
        s.name,
        s.cpu.percent_instant,
        s.memory.rss_formatted(),
        s.thread_count,
        s.open_file_descriptors,
    )
}

fn format_sample_detailed(s: &ProcessSample) -> String {
    let mut sb = String::with_capacity(1024);

    sb.push_str(&format!("PROCESO: {} (PID: {})\n", s.name, s.pid));
    sb.push_str(&"=".repeat(60));
    sb.push('\n');
    sb.push_str(&format!("  Usuario:    {}\n", s.user));
    sb.push_str(&format!("  Estado:     {}\n", s.state.description()));
    sb.push_str(&format!("  Comando:    {}\n", s.command_line));
    sb.push('\n');
    sb.push_str("  CPU:\n");
    sb.push_str(&format!("    Actual:   {}\n", s.cpu.percent_formatted()));
    sb.push_str(&format!("    User:     {} ms\n", s.cpu.user_time_ms));
    sb.push_str(&format!("    System:   {} ms\n", s.cpu.system_time_ms));
    sb.push('\n');
    sb.push_str("  MEMORIA:\n");
    sb.push_str(&format!("    RSS:      {}\n", s.memory.rss_formatted()));
    sb.push_str(&format!("    Virtual:  {}\n", s.memory.virtual_formatted()));
    sb.push_str(&format!(
        "    % Total:  {:.1}%\n",
        s.memory.percent_of_total
    ));
    sb.push('\n');
    sb.push_str("  I/O:\n");
    sb.push_str(&format!("    Read:     {}\n", s.io.read_formatted()));
    sb.push_str(&format!("    Write:    {}\n", s.io.write_formatted()));
    sb.push('\n');
    sb.push_str("  RECURSOS:\n");
    sb.push_str(&format!("    Threads:  {}\n", s.thread_count));
    sb.push_str(&format!("    FDs:      {}\n", s.open_file_descriptors));

    sb
}

fn format_sample_json(s: &ProcessSample) -> String {
    let mut sb = String::with_capacity(512);
    sb.push('{');
    sb.push_str(&format!("\"pid\":{}", s.pid));
    sb.push_str(&format!(",\"name\":\"{}\"", escape_json(&s.name)));
    sb.push_str(&format!(",\"user\":\"{}\"", escape_json(&s.user)));
    sb.push_str(&format!(",\"state\":\"{}\"", s.state.code()));
    sb.push_str(&format!(
        ",\"commandLine\":\"{}\"",
        escape_json(&s.command_line)
    ));
    sb.push_str(&format!(
        ",\"cpu\":{{\"percent\":{:.2},\"userMs\":{},\"systemMs\":{}}}",
        s.cpu.percent_instant, s.cpu.user_time_ms, s.cpu.system_time_ms,
    ));
    sb.push_str(&format!(
        ",\"memory\":{{\"rssBytes\":{},\"virtualBytes\":{},\"percentOfTotal\":{:.2}}}",
        s.memory.rss_bytes, s.memory.virtual_bytes, s.memory.percent_of_total,
    ));
    sb.push_str(&format!(
        ",\"io\":{{\"readBytes\":{},\"writeBytes\":{}}}",
        s.io.read_bytes, s.io.write_bytes,
    ));
    sb.push_str(&format!(",\"threads\":{}", s.thread_count));
    sb.push_str(&format!(",\"fileDescriptors\":{}", s.open_file_descriptors));
    sb.push('}');
    sb
}

fn format_sample_jsonl(s: &ProcessSample) -> String {
    format_sample_json(s)
}

fn format_multiple_samples_json(samples: &[ProcessSample]) -> String {
    let mut sb = String::with_capacity(samples.len() * 512);
    sb.push('[');
    for (i, s) in samples.iter().enumerate() {
        if i > 0 {
            sb.push(',');
        }
        sb.push_str(&format_sample_json(s));
    }
    sb.push(']');
    sb
}

// ════════════════════════════════════════════════════════════════════════
//  String utilities
// ════════════════════════════════════════════════════════════════════════

/// Escapes special characters for JSON string values.
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

// ════════════════════════════════════════════════════════════════════════
//  Documentation builder
// ════════════════════════════════════════════════════════════════════════

fn build_documentation() -> Documentation {
    Documentation::new("proc-watch [opciones] [--pid <PID> | --name <proceso>]")
        .with_long_description(
            "Monitor avanzado de procesos del sistema. Muestra metricas en tiempo real \
             de CPU, memoria, threads, descriptores de archivo e I/O. Soporta alertas \
             configurables con DSL, monitoreo continuo y salida JSON/JSONL.",
        )
        // Target selection
        .with_option(OptionDoc::with_value("pid", "ID del proceso a monitorear").with_short("p"))
        .with_option(
            OptionDoc::with_value("name", "Nombre del proceso (busqueda parcial)").with_short("n"),
        )
        .with_option(
            OptionDoc::with_value(
                "match",
                "Filtro adicional en linea de comandos (con --name)",
            )
            .with_short("m"),
        )
        // Mode options
        .with_option(
            OptionDoc::with_value("top", "Modo top: cpu o memory (ej: --top cpu)").with_short("t"),
        )
        .with_option(
            OptionDoc::with_value("limit", "Limite de procesos en modo top (default: 10)")
                .with_short("l"),
        )
        // Monitoring options
        .with_option(
            OptionDoc::with_value(
                "interval",
                "Intervalo de muestreo (ej: 1s, 500ms, 5m). Default: 1s",
            )
            .with_short("i"),
        )
        .with_option(
            OptionDoc::with_value("count", "Numero de muestras (default: infinito)")
                .with_short("c"),
        )
        .with_option(OptionDoc::flag("once", "Muestra una sola vez y termina"))
        // Alert options
        .with_option(
            OptionDoc::with_value("alert", "Regla de alerta DSL (puede repetirse)").with_short("a"),
        )
        .with_option(OptionDoc::with_value(
            "dump-on-breach",
            "Ejecutar dump al violar alerta: lsof, pstack, jstack, jmap",
        ))
        // Output options
        .with_option(OptionDoc::flag("json", "Salida en formato JSON").with_short("j"))
        .with_option(OptionDoc::flag(
            "jsonl",
            "Salida en formato JSON Lines (una linea por muestra)",
        ))
        .with_option(OptionDoc::flag("compact", "Formato compacto de una linea"))
        .with_option(OptionDoc::flag("quiet", "Solo mostrar alertas").with_short("q"))
        .with_option(OptionDoc::flag(
            "jvm",
            "Incluir metricas JVM (heap, threads, GC) si el proceso es Java",
        ))
        // Utility options
        .with_option(OptionDoc::flag(
            "list-alerts",
            "Muestra sintaxis de alertas disponibles",
        ))
        // Examples
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123",
            "Monitorea proceso por PID",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --name java",
            "Monitorea todos los procesos 'java'",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --name java --match 'myservice'",
            "Filtra por comando",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --top cpu --limit 10",
            "Top 10 por CPU en tiempo real",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --top memory --interval 5s",
            "Top por memoria cada 5s",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --once",
            "Muestra metricas una vez",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --json",
            "Salida JSON",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --jsonl --count 100",
            "100 muestras en JSONL",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --alert 'cpu>80%'",
            "Alerta si CPU > 80%",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --alert 'rss>1.5GB'",
            "Alerta si RAM > 1.5GB",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --alert 'cpu>80% for 30s'",
            "Sostenido 30s",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --alert 'threads>100'",
            "Alerta por threads",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --dump-on-breach lsof",
            "Dump al violar",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --alert 'heap>90%' --dump-on-breach jstack",
            "Dump de stack Java al violar",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --pid 4123 --jvm --once",
            "Incluye metricas JVM en la muestra",
        ))
        .with_example(ExampleDoc::new(
            "proc-watch --list-alerts",
            "Muestra sintaxis de alertas",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_seconds() {
        assert_eq!(parse_interval("1s"), Duration::from_secs(1));
        assert_eq!(parse_interval("5s"), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_interval_millis() {
        assert_eq!(parse_interval("500ms"), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_interval_minutes() {
        assert_eq!(parse_interval("5m"), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_interval_hours() {
        assert_eq!(parse_interval("1h"), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_interval_bare_number_defaults_to_seconds() {
        assert_eq!(parse_interval("3"), Duration::from_secs(3));
    }

    #[test]
    fn test_parse_interval_invalid_defaults_to_1s() {
        assert_eq!(parse_interval("abc"), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_dump_type() {
        assert_eq!(parse_dump_type("lsof"), Some(DumpType::Lsof));
        assert_eq!(parse_dump_type("LSOF"), Some(DumpType::Lsof));
        assert_eq!(parse_dump_type("pstack"), Some(DumpType::Pstack));
        assert_eq!(parse_dump_type("jstack"), Some(DumpType::Jstack));
        assert_eq!(parse_dump_type("jmap"), Some(DumpType::Jmap));
        assert_eq!(parse_dump_type("unknown"), None);
    }

    #[test]
    fn test_parse_alert_expressions_all_valid() {
        let parser = AlertParser::new();
        let exprs = vec!["cpu>80%".to_string(), "rss>1GB".to_string()];
        let rules = parse_alert_expressions(&exprs, &parser).expect("should parse");
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_parse_alert_expressions_rejects_whole_batch_on_any_failure() {
        let parser = AlertParser::new();
        let exprs = vec!["cpu>80%".to_string(), "not-a-rule".to_string()];
        let errors = parse_alert_expressions(&exprs, &parser).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_collect_alert_expressions_preserves_every_repeated_flag() {
        let args: Vec<String> = command_parser::tokenize(
            "--pid 1 --alert cpu>80% --alert rss>1GB --alert threads>100",
        );
        let parsed = command_parser::parse(&args);
        let exprs = collect_alert_expressions(&parsed);
        assert_eq!(
            exprs,
            vec![
                "cpu>80%".to_string(),
                "rss>1GB".to_string(),
                "threads>100".to_string(),
            ]
        );
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json(r#"hello "world""#), r#"hello \"world\""#);
        assert_eq!(escape_json("line1\nline2"), r"line1\nline2");
        assert_eq!(escape_json("path\\to\\file"), r"path\\to\\file");
        assert_eq!(escape_json("tab\there"), r"tab\there");
    }

    #[test]
    fn test_format_sample_json_structure() {
        let sample = ProcessSample::minimal(42, "my-proc", "root");
        let json = format_sample_json(&sample);
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("\"pid\":42"));
        assert!(json.contains("\"name\":\"my-proc\""));
        assert!(json.contains("\"cpu\":{"));
        assert!(json.contains("\"memory\":{"));
        assert!(json.contains("\"io\":{"));
    }

    #[test]
    fn test_format_sample_line_contains_pid() {
        let sample = ProcessSample::minimal(123, "nginx", "www");
        let line = format_sample_line(&sample);
        assert!(line.contains("PID=123"));
        assert!(line.contains("nginx"));
    }

    #[test]
    fn test_format_sample_compact_pipe_separated() {
        let sample = ProcessSample::minimal(7, "worker", "app");
        let compact = format_sample_compact(&sample);
        assert!(compact.contains('|'));
        assert!(compact.starts_with("7|worker|"));
    }

    #[test]
    fn test_format_sample_detailed_contains_sections() {
        let sample = ProcessSample::minimal(1, "test-proc", "dev");
        let detailed = format_sample_detailed(&sample);
        assert!(detailed.contains("PROCESO: test-proc (PID: 1)"));
        assert!(detailed.contains("CPU:"));
        assert!(detailed.contains("MEMORIA:"));
        assert!(detailed.contains("I/O:"));
        assert!(detailed.contains("RECURSOS:"));
    }

    #[test]
    fn test_format_multiple_samples_json_array() {
        let s1 = ProcessSample::minimal(1, "a", "u");
        let s2 = ProcessSample::minimal(2, "b", "u");
        let json = format_multiple_samples_json(&[s1, s2]);
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
        assert!(json.contains("\"pid\":1"));
        assert!(json.contains("\"pid\":2"));
    }
}
