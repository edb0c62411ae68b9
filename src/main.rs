use clap::{Parser, Subcommand};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_FILE_NAME: &str = ".swpf.toml";
const CONFIG_ENV: &str = "SWPF_CONFIG";
const NETSH_ENV: &str = "SWPF_NETSH";
const LOG_ENV: &str = "SWPF_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "swpf",
    version,
    about = "Switch Windows port proxies and firewall rules per service"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(long, global = true, hide = true)]
    netsh: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show port proxies and the firewall rule of one or every service
    Status { service: Option<String> },
    /// Add the service's port proxies and enable its firewall rule
    Enable { service: String },
    /// Delete the service's port proxies and disable its firewall rule
    Disable { service: String },
    Config,
}

#[derive(Debug, Error)]
enum SwpfError {
    #[error("environment error: {0}")]
    Environment(String),
    #[error("config file read failed: {}: {source}", path.display())]
    ConfigUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file {} is invalid: {source}", path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
    #[error("there are no settings for the specified service ({name}) in {}", path.display())]
    UnknownService { name: String, path: PathBuf },
    #[error("argument error: {0}")]
    Argument(String),
    #[error("failed to run command `{command}`: {source}")]
    ToolLaunch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("command failed with status {status_code} while running `{command}`")]
    ExternalTool {
        command: String,
        status_code: i32,
        stdout: String,
        stderr: String,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SwpfError {
    fn exit_code(&self) -> i32 {
        match self {
            SwpfError::ExternalTool { status_code, .. } if *status_code != 0 => *status_code,
            _ => 1,
        }
    }
}

/// A config shape violation, keyed by the dotted path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceSpec {
    #[serde(skip)]
    name: String,
    listen_addr: String,
    connect_addr: String,
    bind_ports: Vec<i64>,
    fw_rule_name: String,
}

// Every field is optional and untyped so that validation can name exactly
// which one is missing or has the wrong type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ServiceCandidate {
    listen_addr: Option<toml::Value>,
    connect_addr: Option<toml::Value>,
    bind_ports: Option<toml::Value>,
    fw_rule_name: Option<toml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
struct ConfigDocument {
    services: BTreeMap<String, ServiceSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleAction {
    Enable,
    Disable,
    Status,
}

impl RuleAction {
    fn as_str(self) -> &'static str {
        match self {
            RuleAction::Enable => "enable",
            RuleAction::Disable => "disable",
            RuleAction::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    One(String),
    All,
}

impl Selector {
    fn from_arg(service: Option<String>) -> Result<Self, SwpfError> {
        match service {
            None => Ok(Selector::All),
            Some(name) if name.trim().is_empty() => Err(SwpfError::Argument(
                "service name must not be empty".to_string(),
            )),
            Some(name) => Ok(Selector::One(name)),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonResult<T: Serialize> {
    ok: bool,
    result: Option<T>,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_details: Option<ToolErrorDetails>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct ToolErrorDetails {
    error_code: String,
    exit_code: i32,
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    stderr: String,
}

#[derive(Debug, Clone)]
struct Context {
    config_path: PathBuf,
    netsh_override: Option<PathBuf>,
    json: bool,
}

#[derive(Debug, Clone)]
struct CommandOutput {
    status_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CommandOutput {
    fn success(&self) -> bool {
        self.status_code == 0
    }

    fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

trait NetshRunner {
    fn run(&self, args: &[String]) -> Result<CommandOutput, io::Error>;
}

struct RealNetshRunner {
    program: PathBuf,
}

impl RealNetshRunner {
    fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl NetshRunner for RealNetshRunner {
    fn run(&self, args: &[String]) -> Result<CommandOutput, io::Error> {
        let output = Command::new(&self.program).args(args).output()?;
        let status_code = output
            .status
            .code()
            .unwrap_or(if output.status.success() { 0 } else { 1 });
        Ok(CommandOutput {
            status_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// One `netsh` call. The argument grammar has to match netsh exactly; each
/// portproxy call accepts a single listen/connect port pair.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation<'a> {
    AddPortProxy {
        listen_addr: &'a str,
        connect_addr: &'a str,
        port: i64,
    },
    DeletePortProxy {
        listen_addr: &'a str,
        port: i64,
    },
    ShowPortProxy,
    ShowFirewallRule {
        rule_name: &'a str,
    },
    SetFirewallRule {
        rule_name: &'a str,
        enabled: bool,
    },
}

impl Invocation<'_> {
    fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        match self {
            Invocation::AddPortProxy {
                listen_addr,
                connect_addr,
                port,
            } => {
                args.extend(portproxy_verb("add"));
                args.push(format!("listenAddress={listen_addr}"));
                args.push(format!("listenPort={port}"));
                args.push(format!("connectAddress={connect_addr}"));
                args.push(format!("connectPort={port}"));
            }
            Invocation::DeletePortProxy { listen_addr, port } => {
                args.extend(portproxy_verb("delete"));
                args.push(format!("listenAddress={listen_addr}"));
                args.push(format!("listenPort={port}"));
            }
            Invocation::ShowPortProxy => args.extend(portproxy_verb("show")),
            Invocation::ShowFirewallRule { rule_name } => {
                args.extend(firewall_rule_verb("show"));
                args.push(format!("name={rule_name}"));
            }
            Invocation::SetFirewallRule { rule_name, enabled } => {
                args.extend(firewall_rule_verb("set"));
                args.push(format!("name={rule_name}"));
                args.push("new".to_string());
                args.push(if *enabled { "enable=yes" } else { "enable=no" }.to_string());
            }
        }
        args
    }
}

fn portproxy_verb(verb: &str) -> Vec<String> {
    ["interface", "portProxy", verb, "v4tov4"]
        .iter()
        .map(|part| part.to_string())
        .collect()
}

fn firewall_rule_verb(verb: &str) -> Vec<String> {
    ["advFirewall", "firewall", verb, "rule"]
        .iter()
        .map(|part| part.to_string())
        .collect()
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logger(cli.verbose);

    let json = cli.json;
    let result = build_context(&cli).and_then(|ctx| dispatch(&ctx, cli.command));

    if let Err(err) = result {
        report_error(json, &err);
        std::process::exit(err.exit_code());
    }
}

fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("swpf=debug")
        } else {
            EnvFilter::new("error")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn build_context(cli: &Cli) -> Result<Context, SwpfError> {
    let config_path = resolve_config_path(cli.config.as_ref())?;
    let netsh_override = resolve_netsh_override(cli.netsh.as_ref());
    Ok(Context {
        config_path,
        netsh_override,
        json: cli.json,
    })
}

fn resolve_config_path(override_path: Option<&PathBuf>) -> Result<PathBuf, SwpfError> {
    if let Some(path) = override_path {
        return Ok(path.clone());
    }
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let home = home_dir().ok_or_else(|| {
        SwpfError::Environment(
            "unable to resolve the home directory; set HOME (USERPROFILE on Windows)".to_string(),
        )
    })?;
    Ok(home.join(CONFIG_FILE_NAME))
}

fn resolve_netsh_override(override_path: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.clone());
    }
    match env::var(NETSH_ENV) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

fn resolve_netsh_program(ctx: &Context) -> Result<PathBuf, SwpfError> {
    if let Some(path) = &ctx.netsh_override {
        return Ok(path.clone());
    }
    if env::consts::OS == "windows" {
        return Ok(PathBuf::from("netsh"));
    }
    Err(SwpfError::Environment(format!(
        "only Windows is supported (running on {}); set {NETSH_ENV} to a netsh-compatible tool",
        env::consts::OS
    )))
}

fn dispatch(ctx: &Context, command: Commands) -> Result<(), SwpfError> {
    match command {
        Commands::Config => handle_config(ctx),
        Commands::Status { service } => {
            let runner = RealNetshRunner::new(resolve_netsh_program(ctx)?);
            reconcile(ctx, &runner, RuleAction::Status, &Selector::from_arg(service)?)
        }
        Commands::Enable { service } => {
            let runner = RealNetshRunner::new(resolve_netsh_program(ctx)?);
            reconcile(ctx, &runner, RuleAction::Enable, &Selector::from_arg(Some(service))?)
        }
        Commands::Disable { service } => {
            let runner = RealNetshRunner::new(resolve_netsh_program(ctx)?);
            reconcile(ctx, &runner, RuleAction::Disable, &Selector::from_arg(Some(service))?)
        }
    }
}

impl ConfigDocument {
    fn load(path: &Path) -> Result<Self, SwpfError> {
        let content = fs::read_to_string(path).map_err(|source| SwpfError::ConfigUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::parse(&content).map_err(|source| SwpfError::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            services = document.services.len(),
            "loaded config"
        );
        Ok(document)
    }

    fn parse(content: &str) -> Result<Self, ValidationError> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|err| ValidationError::new("document", err.to_string().trim_end()))?;
        if table.is_empty() {
            return Err(ValidationError::new(
                "document",
                "config must define at least one service",
            ));
        }
        let mut services = BTreeMap::new();
        for (name, value) in table {
            let service = validate_service(&name, value)?;
            services.insert(name, service);
        }
        Ok(Self { services })
    }

    fn select(&self, selector: &Selector, path: &Path) -> Result<Vec<&ServiceSpec>, SwpfError> {
        match selector {
            Selector::All => Ok(self.services.values().collect()),
            Selector::One(name) => self
                .services
                .get(name)
                .map(|service| vec![service])
                .ok_or_else(|| SwpfError::UnknownService {
                    name: name.clone(),
                    path: path.to_path_buf(),
                }),
        }
    }
}

fn validate_service(name: &str, value: toml::Value) -> Result<ServiceSpec, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new(
            "document",
            "service names must not be empty",
        ));
    }
    if !value.is_table() {
        return Err(ValidationError::new(
            name,
            format!("expected a table, found {}", value.type_str()),
        ));
    }
    let candidate = value
        .try_into::<ServiceCandidate>()
        .map_err(|err| ValidationError::new(name, err.message()))?;
    Ok(ServiceSpec {
        name: name.to_string(),
        listen_addr: require_string(name, "listenAddr", candidate.listen_addr)?,
        connect_addr: require_string(name, "connectAddr", candidate.connect_addr)?,
        bind_ports: require_ports(name, candidate.bind_ports)?,
        fw_rule_name: require_string(name, "fwRuleName", candidate.fw_rule_name)?,
    })
}

fn require_string(
    service: &str,
    field: &str,
    value: Option<toml::Value>,
) -> Result<String, ValidationError> {
    let path = format!("{service}.{field}");
    match value {
        Some(toml::Value::String(text)) => Ok(text),
        Some(other) => Err(ValidationError::new(
            path,
            format!("expected a string, found {}", other.type_str()),
        )),
        None => Err(ValidationError::new(path, "missing required field")),
    }
}

// Port ranges are left to netsh, which rejects invalid ports itself.
fn require_ports(service: &str, value: Option<toml::Value>) -> Result<Vec<i64>, ValidationError> {
    let path = format!("{service}.bindPorts");
    let items = match value {
        Some(toml::Value::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::new(
                path,
                format!("expected an array of port numbers, found {}", other.type_str()),
            ))
        }
        None => return Err(ValidationError::new(path, "missing required field")),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            toml::Value::Integer(port) => Ok(port),
            other => Err(ValidationError::new(
                format!("{path}[{index}]"),
                format!("expected an integer, found {}", other.type_str()),
            )),
        })
        .collect()
}

fn handle_config(ctx: &Context) -> Result<(), SwpfError> {
    let document = ConfigDocument::load(&ctx.config_path)?;
    if ctx.json {
        return output(ctx, serde_json::to_value(&document)?);
    }
    print!("{}", toml::to_string_pretty(&document)?);
    Ok(())
}

fn reconcile<R: NetshRunner>(
    ctx: &Context,
    runner: &R,
    action: RuleAction,
    selector: &Selector,
) -> Result<(), SwpfError> {
    let document = ConfigDocument::load(&ctx.config_path)?;
    let services = document.select(selector, &ctx.config_path)?;
    match action {
        RuleAction::Status => report_status(ctx, runner, &services, selector),
        RuleAction::Enable | RuleAction::Disable => {
            let [service] = services.as_slice() else {
                return Err(SwpfError::Argument(format!(
                    "{} requires exactly one service name",
                    action.as_str()
                )));
            };
            toggle_service(ctx, runner, service, action)
        }
    }
}

fn toggle_service<R: NetshRunner>(
    ctx: &Context,
    runner: &R,
    service: &ServiceSpec,
    action: RuleAction,
) -> Result<(), SwpfError> {
    let outputs = apply_rule_action(runner, service, action)?;
    debug!(
        service = %service.name,
        action = action.as_str(),
        invocations = outputs.len(),
        "service updated"
    );
    if ctx.json {
        return output(
            ctx,
            json!({
                "service": service.name,
                "action": action.as_str(),
                "listen_addr": service.listen_addr,
                "connect_addr": service.connect_addr,
                "bind_ports": service.bind_ports,
                "fw_rule_name": service.fw_rule_name,
            }),
        );
    }
    match action {
        RuleAction::Enable => println!("Enabled"),
        RuleAction::Disable => println!("Disabled"),
        RuleAction::Status => {}
    }
    Ok(())
}

fn report_status<R: NetshRunner>(
    ctx: &Context,
    runner: &R,
    services: &[&ServiceSpec],
    selector: &Selector,
) -> Result<(), SwpfError> {
    let port_proxy = show_port_proxies(runner)?;
    if !ctx.json {
        echo_output(&port_proxy);
    }

    let mut firewall = Vec::with_capacity(services.len());
    for service in services {
        if !ctx.json && *selector == Selector::All {
            println!("Firewall settings by {}", service.name);
        }
        let outputs = apply_rule_action(runner, service, RuleAction::Status)?;
        if !ctx.json {
            outputs.iter().for_each(echo_output);
        }
        firewall.push(json!({
            "service": service.name,
            "fw_rule_name": service.fw_rule_name,
            "stdout": outputs.iter().map(CommandOutput::stdout_text).collect::<String>(),
        }));
    }

    if ctx.json {
        return output(
            ctx,
            json!({
                "port_proxy": port_proxy.stdout_text(),
                "firewall": firewall,
            }),
        );
    }
    Ok(())
}

fn plan_invocations(service: &ServiceSpec, action: RuleAction) -> Vec<Invocation<'_>> {
    match action {
        RuleAction::Enable => service
            .bind_ports
            .iter()
            .map(|&port| Invocation::AddPortProxy {
                listen_addr: &service.listen_addr,
                connect_addr: &service.connect_addr,
                port,
            })
            .chain(std::iter::once(Invocation::SetFirewallRule {
                rule_name: &service.fw_rule_name,
                enabled: true,
            }))
            .collect(),
        RuleAction::Disable => service
            .bind_ports
            .iter()
            .map(|&port| Invocation::DeletePortProxy {
                listen_addr: &service.listen_addr,
                port,
            })
            .chain(std::iter::once(Invocation::SetFirewallRule {
                rule_name: &service.fw_rule_name,
                enabled: false,
            }))
            .collect(),
        RuleAction::Status => vec![Invocation::ShowFirewallRule {
            rule_name: &service.fw_rule_name,
        }],
    }
}

// Stops at the first failing call. Entries already added or removed stay
// that way; partial enablement is reported, never rolled back.
fn apply_rule_action<R: NetshRunner>(
    runner: &R,
    service: &ServiceSpec,
    action: RuleAction,
) -> Result<Vec<CommandOutput>, SwpfError> {
    let mut outputs = Vec::new();
    for invocation in plan_invocations(service, action) {
        outputs.push(execute_netsh(runner, &invocation)?);
    }
    Ok(outputs)
}

fn show_port_proxies<R: NetshRunner>(runner: &R) -> Result<CommandOutput, SwpfError> {
    execute_netsh(runner, &Invocation::ShowPortProxy)
}

fn execute_netsh<R: NetshRunner>(
    runner: &R,
    invocation: &Invocation<'_>,
) -> Result<CommandOutput, SwpfError> {
    let args = invocation.args();
    let command = render_netsh_command(&args);
    debug!(%command, "running netsh");
    let cmd_output = runner
        .run(&args)
        .map_err(|source| SwpfError::ToolLaunch {
            command: command.clone(),
            source,
        })?;
    if !cmd_output.success() {
        warn!(%command, status = cmd_output.status_code, "netsh reported failure");
        return Err(SwpfError::ExternalTool {
            command,
            status_code: cmd_output.status_code,
            stdout: cmd_output.stdout_text(),
            stderr: cmd_output.stderr_text(),
        });
    }
    Ok(cmd_output)
}

fn render_netsh_command(args: &[String]) -> String {
    fn shell_quote(part: &str) -> String {
        if part.is_empty() {
            return "\"\"".to_string();
        }
        if part.chars().any(|c| c.is_whitespace()) {
            return format!("\"{}\"", part.replace('"', "\\\""));
        }
        part.to_string()
    }
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push("netsh".to_string());
    parts.extend(args.iter().map(|arg| shell_quote(arg)));
    parts.join(" ")
}

fn classify_netsh_failure(stdout: &str, stderr: &str) -> (String, Option<String>) {
    let lower = format!("{stdout}\n{stderr}").to_lowercase();

    if lower.contains("requires elevation") || lower.contains("run as administrator") {
        return (
            "netsh_elevation_required".to_string(),
            Some("Run swpf from an elevated (Administrator) shell.".to_string()),
        );
    }

    if lower.contains("no rules match the specified criteria") {
        return (
            "firewall_rule_not_found".to_string(),
            Some(
                "The firewall rule does not exist. Create it first; swpf only enables or disables existing rules."
                    .to_string(),
            ),
        );
    }

    if lower.contains("cannot find the file specified") {
        return (
            "port_proxy_not_found".to_string(),
            Some(
                "The port proxy entry does not exist. Check `swpf status` for the current mappings."
                    .to_string(),
            ),
        );
    }

    if lower.contains("the parameter is incorrect") {
        return (
            "netsh_invalid_parameter".to_string(),
            Some(
                "netsh rejected an argument. Check listenAddr, connectAddr and bindPorts in the config file."
                    .to_string(),
            ),
        );
    }

    ("netsh_command_failed".to_string(), None)
}

fn tool_error_details(err: &SwpfError) -> Option<ToolErrorDetails> {
    match err {
        SwpfError::ExternalTool {
            command,
            status_code,
            stdout,
            stderr,
        } => {
            let (error_code, hint) = classify_netsh_failure(stdout, stderr);
            Some(ToolErrorDetails {
                error_code,
                exit_code: err.exit_code(),
                command: command.clone(),
                hint,
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            })
        }
        SwpfError::ToolLaunch { command, source } => {
            let (error_code, hint) = if source.kind() == io::ErrorKind::NotFound {
                (
                    "netsh_not_found".to_string(),
                    Some(format!(
                        "Ensure netsh is on your PATH, or set {NETSH_ENV} to a compatible tool."
                    )),
                )
            } else {
                ("netsh_launch_failed".to_string(), None)
            };
            Some(ToolErrorDetails {
                error_code,
                exit_code: err.exit_code(),
                command: command.clone(),
                hint,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
        _ => None,
    }
}

fn report_error(json: bool, err: &SwpfError) {
    let details = tool_error_details(err);
    if json {
        let payload = JsonResult::<serde_json::Value> {
            ok: false,
            result: None,
            error: Some(err.to_string()),
            error_details: details,
        };
        if let Err(print_err) = print_json(&payload) {
            eprintln!("{print_err}");
        }
        return;
    }

    if let SwpfError::ExternalTool { stdout, stderr, .. } = err {
        if !stdout.is_empty() {
            print!("{stdout}");
            let _ = io::stdout().flush();
        }
        if !stderr.is_empty() {
            eprint!("{stderr}");
        }
    }
    eprintln!("{err}");
    if let Some(hint) = details.and_then(|details| details.hint) {
        eprintln!("Hint: {hint}");
    }
}

fn echo_output(cmd_output: &CommandOutput) {
    if !cmd_output.stdout.is_empty() {
        print!("{}", cmd_output.stdout_text());
    }
    if !cmd_output.stderr.is_empty() {
        eprint!("{}", cmd_output.stderr_text());
    }
}

fn output(ctx: &Context, payload: serde_json::Value) -> Result<(), SwpfError> {
    if ctx.json {
        let wrapper = JsonResult {
            ok: true,
            result: Some(payload),
            error: None,
            error_details: None,
        };
        print_json(&wrapper)?;
    } else {
        println!("{}", payload);
    }
    Ok(())
}

fn print_json<T: Serialize>(payload: &T) -> Result<(), SwpfError> {
    let text = serde_json::to_string_pretty(payload)?;
    println!("{}", text);
    Ok(())
}
