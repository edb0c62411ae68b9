use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const WEB_CONFIG: &str = r#"
[web]
listenAddr = "127.0.0.1"
connectAddr = "10.0.0.5"
bindPorts = [80, 443]
fwRuleName = "WebRule"

[api]
listenAddr = "0.0.0.0"
connectAddr = "10.0.0.6"
bindPorts = [8080]
fwRuleName = "ApiRule"
"#;

fn bin() -> Command {
    let path = assert_cmd::cargo::cargo_bin!("swpf");
    let mut cmd = Command::new(path);
    cmd.env_remove("SWPF_CONFIG")
        .env_remove("SWPF_NETSH")
        .env_remove("SWPF_LOG");
    cmd
}

fn parse_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json output")
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("swpf.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn missing_subcommand_exits_one() {
    bin().assert().code(1).stderr(contains("subcommand"));
}

#[test]
fn unknown_subcommand_exits_one() {
    bin()
        .arg("frobnicate")
        .assert()
        .code(1)
        .stderr(contains("unrecognized subcommand"));
}

#[test]
fn enable_requires_exactly_one_service() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), WEB_CONFIG);

    bin()
        .arg("--config")
        .arg(&config_path)
        .arg("enable")
        .assert()
        .code(1)
        .stderr(contains("<SERVICE>"));

    bin()
        .arg("--config")
        .arg(&config_path)
        .arg("disable")
        .arg("web")
        .arg("api")
        .assert()
        .code(1);
}

#[test]
fn help_exits_zero() {
    bin().arg("--help").assert().success().stdout(contains("status"));
}

#[test]
fn config_missing_file_exits_one() {
    let dir = tempdir().unwrap();
    bin()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("config")
        .assert()
        .code(1)
        .stderr(contains("config file read failed"));
}

#[test]
fn config_prints_document_as_toml() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), WEB_CONFIG);

    bin()
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("[web]"))
        .stdout(contains("listenAddr = \"127.0.0.1\""))
        .stdout(contains("fwRuleName = \"ApiRule\""));
}

#[test]
fn config_json_lists_services() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), WEB_CONFIG);

    let output = bin()
        .env("SWPF_CONFIG", &config_path)
        .arg("--json")
        .arg("config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value = parse_json(&output);
    assert!(value["ok"].as_bool().unwrap());
    assert_eq!(value["result"]["web"]["bindPorts"], serde_json::json!([80, 443]));
    assert_eq!(value["result"]["api"]["connectAddr"], "10.0.0.6");
}

#[test]
fn invalid_entry_rejects_whole_config() {
    let dir = tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        "[web]\nlistenAddr = \"a\"\nconnectAddr = \"b\"\nbindPorts = [80]\nfwRuleName = \"r\"\n\n[api]\nlistenAddr = \"a\"\nconnectAddr = \"b\"\nbindPorts = [81]\n",
    );

    let output = bin()
        .arg("--json")
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let value = parse_json(&output);
    assert!(!value["ok"].as_bool().unwrap());
    assert!(value["result"].is_null());
    assert!(value["error"]
        .as_str()
        .unwrap_or_default()
        .contains("api.fwRuleName"));
}

#[test]
fn example_config_is_valid() {
    bin()
        .arg("--config")
        .arg("config/example.swpf.toml")
        .arg("config")
        .assert()
        .success()
        .stdout(contains("[ssh]"));
}

#[cfg(unix)]
#[test]
fn home_config_is_used_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".swpf.toml"), WEB_CONFIG).unwrap();

    bin()
        .env("HOME", dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("[api]"));
}

#[cfg(not(windows))]
#[test]
fn non_windows_without_netsh_override_is_rejected() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), WEB_CONFIG);

    bin()
        .arg("--config")
        .arg(&config_path)
        .arg("status")
        .assert()
        .code(1)
        .stderr(contains("only Windows is supported"));
}

#[cfg(unix)]
mod fake_netsh {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::OnceLock;
    use tempfile::TempDir;

    static SCRIPT_DIR: OnceLock<TempDir> = OnceLock::new();

    const SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "$FAKE_NETSH_LOG"
if [ -n "$FAKE_NETSH_FAIL_ON" ]; then
  case "$*" in
    *"$FAKE_NETSH_FAIL_ON"*)
      echo "The parameter is incorrect."
      echo "fake netsh failure: $*" >&2
      exit "${FAKE_NETSH_EXIT:-1}"
      ;;
  esac
fi
echo "netsh ok: $*"
"#;

    fn script() -> PathBuf {
        let dir = SCRIPT_DIR.get_or_init(|| {
            let dir = tempdir().unwrap();
            let path = dir.path().join("netsh");
            fs::write(&path, SCRIPT).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            dir
        });
        dir.path().join("netsh")
    }

    struct Harness {
        _dir: TempDir,
        config_path: PathBuf,
        log_path: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let config_path = write_config(dir.path(), WEB_CONFIG);
            let log_path = dir.path().join("netsh.log");
            Self {
                _dir: dir,
                config_path,
                log_path,
            }
        }

        fn cmd(&self) -> Command {
            let mut cmd = bin();
            cmd.env("SWPF_NETSH", script())
                .env("FAKE_NETSH_LOG", &self.log_path)
                .arg("--config")
                .arg(&self.config_path);
            cmd
        }

        fn calls(&self) -> Vec<String> {
            fs::read_to_string(&self.log_path)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn enable_adds_ports_in_order_then_enables_rule() {
        let harness = Harness::new();

        harness
            .cmd()
            .arg("enable")
            .arg("web")
            .assert()
            .success()
            .stdout(contains("Enabled"));

        assert_eq!(
            harness.calls(),
            vec![
                "interface portProxy add v4tov4 listenAddress=127.0.0.1 listenPort=80 connectAddress=10.0.0.5 connectPort=80",
                "interface portProxy add v4tov4 listenAddress=127.0.0.1 listenPort=443 connectAddress=10.0.0.5 connectPort=443",
                "advFirewall firewall set rule name=WebRule new enable=yes",
            ]
        );
    }

    #[test]
    fn enable_failure_skips_firewall_and_echoes_tool_output() {
        let harness = Harness::new();

        harness
            .cmd()
            .env("FAKE_NETSH_FAIL_ON", "listenPort=443")
            .arg("enable")
            .arg("web")
            .assert()
            .code(1)
            .stdout(contains("The parameter is incorrect."))
            .stderr(contains("fake netsh failure"))
            .stderr(contains("Hint:"));

        let calls = harness.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|call| !call.starts_with("advFirewall")));
    }

    #[test]
    fn tool_exit_code_is_propagated() {
        let harness = Harness::new();

        harness
            .cmd()
            .env("FAKE_NETSH_FAIL_ON", "enable=no")
            .env("FAKE_NETSH_EXIT", "7")
            .arg("disable")
            .arg("api")
            .assert()
            .code(7);

        assert_eq!(
            harness.calls(),
            vec![
                "interface portProxy delete v4tov4 listenAddress=0.0.0.0 listenPort=8080",
                "advFirewall firewall set rule name=ApiRule new enable=no",
            ]
        );
    }

    #[test]
    fn disable_reports_disabled() {
        let harness = Harness::new();

        harness
            .cmd()
            .arg("disable")
            .arg("web")
            .assert()
            .success()
            .stdout(contains("Disabled"));

        assert_eq!(harness.calls().len(), 3);
    }

    #[test]
    fn status_without_service_labels_every_service() {
        let harness = Harness::new();

        harness
            .cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(contains("netsh ok: interface portProxy show v4tov4"))
            .stdout(contains("Firewall settings by api"))
            .stdout(contains("Firewall settings by web"));

        assert_eq!(
            harness.calls(),
            vec![
                "interface portProxy show v4tov4",
                "advFirewall firewall show rule name=ApiRule",
                "advFirewall firewall show rule name=WebRule",
            ]
        );
    }

    #[test]
    fn status_for_one_service_queries_only_its_rule() {
        let harness = Harness::new();

        harness.cmd().arg("status").arg("web").assert().success();

        assert_eq!(
            harness.calls(),
            vec![
                "interface portProxy show v4tov4",
                "advFirewall firewall show rule name=WebRule",
            ]
        );
    }

    #[test]
    fn status_unknown_service_runs_nothing() {
        let harness = Harness::new();

        harness
            .cmd()
            .arg("status")
            .arg("db")
            .assert()
            .code(1)
            .stderr(contains("(db)"));

        assert!(harness.calls().is_empty());
    }

    #[test]
    fn json_failure_carries_tool_details() {
        let harness = Harness::new();

        let output = harness
            .cmd()
            .env("FAKE_NETSH_FAIL_ON", "listenPort=80")
            .arg("--json")
            .arg("enable")
            .arg("web")
            .assert()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let value = parse_json(&output);
        assert!(!value["ok"].as_bool().unwrap());
        let details = &value["error_details"];
        assert_eq!(details["error_code"], "netsh_invalid_parameter");
        assert_eq!(details["exit_code"], 1);
        assert!(details["command"]
            .as_str()
            .unwrap_or_default()
            .contains("listenPort=80"));
        assert_eq!(harness.calls().len(), 1);
    }

    #[test]
    fn json_status_collects_rule_output() {
        let harness = Harness::new();

        let output = harness
            .cmd()
            .arg("--json")
            .arg("status")
            .arg("api")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let value = parse_json(&output);
        assert!(value["ok"].as_bool().unwrap());
        assert_eq!(value["result"]["firewall"][0]["service"], "api");
        assert!(value["result"]["port_proxy"]
            .as_str()
            .unwrap_or_default()
            .contains("show v4tov4"));
    }
}
