use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;
use ticketdash_core::db::{Database, RAW_DATA_KEY};

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    csv: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        let csv = base.join("tickets.csv");
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../ticketdash-core/tests/fixtures/tickets.csv");
        fs::copy(source, &csv).expect("failed to copy ticket fixture");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
            csv,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("ticketdash/ticketdash.db")
    }

    fn csv_arg(&self) -> String {
        self.csv.to_string_lossy().into_owned()
    }

    fn write_config(&self, toml: &str) {
        let dir = self.xdg_config.join("ticketdash");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), toml).expect("failed to write config");
    }

    fn setup(&self) {
        let csv = self.csv_arg();
        let args = ["setup", csv.as_str(), "--name", "Ana", "--role", "Support"];
        let output = run_bin(self, &args);
        assert_success(&args, &output);
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("ticketdash"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute ticketdash: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "ticketdash {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn stdout_of(env: &CliTestEnv, args: &[&str]) -> String {
    let output = run_bin(env, args);
    assert_success(args, &output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn report_without_setup_prints_hint() {
    let env = CliTestEnv::new();

    let stdout = stdout_of(&env, &["report"]);
    assert!(
        stdout.contains("ticketdash setup"),
        "expected setup hint, got:\n{stdout}"
    );
}

#[test]
fn setup_report_reset_round_trip() {
    let env = CliTestEnv::new();

    let csv = env.csv_arg();
    let setup_args = ["setup", csv.as_str(), "--name", "Ana", "--role", "Support"];
    let setup = stdout_of(&env, &setup_args);
    assert!(setup.contains("Setup complete:"));
    assert!(setup.contains("Tickets:  12"));
    assert!(setup.contains("2024-01, 2024-02"));
    assert!(env.db_path().exists(), "database should be created");

    let report = stdout_of(&env, &["report"]);
    assert!(report.contains("Ticket Report: All periods (Ana)"));
    assert!(report.contains("Tickets:      12"));
    assert!(report.contains("Avg per day:  0.6"));
    assert!(report.contains("Per month day: 0.3"));
    assert!(report.contains("Principal:      ACME"));

    let reset = stdout_of(&env, &["reset", "--yes"]);
    assert!(reset.contains("Cleared"));

    let after = stdout_of(&env, &["report"]);
    assert!(after.contains("ticketdash setup"));
}

#[test]
fn month_report_shows_variations_as_json() {
    let env = CliTestEnv::new();
    env.setup();

    let stdout = stdout_of(
        &env,
        &["report", "--month", "2024-02", "--export", "json"],
    );
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("report should be JSON");

    assert_eq!(json["period"], "2024-02");
    assert_eq!(json["snapshot"]["totalCards"], 7);
    assert_eq!(json["user"]["name"], "Ana");

    let variations = json["variations"].as_array().expect("variations array");
    let active = variations
        .iter()
        .find(|v| v["field"] == "totalActive")
        .expect("active variation");
    assert_eq!(active["variation"]["direction"], "increase");
}

#[test]
fn filtered_report_from_file() {
    let env = CliTestEnv::new();
    let csv = env.csv_arg();

    let stdout = stdout_of(
        &env,
        &[
            "report", "--file", &csv, "--analyst", "Ana", "--client", "acme", "--export", "md",
        ],
    );
    assert!(stdout.starts_with("# Ticket Report: All periods"));
    assert!(stdout.contains("**Filters:** analysts Ana; client ACME"));
    assert!(stdout.contains("| Tickets | 3 |"));
}

#[test]
fn months_lists_periods() {
    let env = CliTestEnv::new();
    let csv = env.csv_arg();

    let stdout = stdout_of(&env, &["months", "--file", &csv]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2024-01"));
    assert!(lines[0].contains("5 tickets"));
    assert!(lines[1].contains("7 tickets"));
}

#[test]
fn corrupted_store_asks_for_setup() {
    let env = CliTestEnv::new();
    env.setup();

    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    db.set_value(RAW_DATA_KEY, "{broken").expect("failed to corrupt");
    drop(db);

    let stdout = stdout_of(&env, &["report"]);
    assert!(stdout.contains("ticketdash setup"));
}

#[test]
fn unknown_export_format_fails() {
    let env = CliTestEnv::new();
    let csv = env.csv_arg();

    let output = run_bin(&env, &["report", "--file", &csv, "--export", "pdf"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown export format"));
}

fn json_report(env: &CliTestEnv, args: &[&str]) -> serde_json::Value {
    let stdout = stdout_of(env, args);
    serde_json::from_str(&stdout).expect("report should be JSON")
}

#[test]
fn config_change_invalidates_cached_report() {
    let env = CliTestEnv::new();
    env.setup();

    let before = json_report(&env, &["report", "--export", "json"]);
    assert_eq!(before["snapshot"]["avgPerDay"], "0.6");
    assert_eq!(before["snapshot"]["escalonadoCount"], 2);

    env.write_config("[analytics]\nworking_days = 3\nescalated_status = \"Novo\"\n");

    let cached = json_report(&env, &["report", "--export", "json"]);
    let csv = env.csv_arg();
    let fresh = json_report(&env, &["report", "--file", &csv, "--export", "json"]);

    assert_eq!(cached["snapshot"]["avgPerDay"], "4.0");
    assert_eq!(cached["snapshot"]["escalonadoCount"], 5);
    assert_eq!(cached["snapshot"], fresh["snapshot"]);
}

#[test]
fn client_filter_accepts_full_name() {
    let env = CliTestEnv::new();
    let csv = env.csv_arg();

    let stdout = stdout_of(
        &env,
        &["report", "--file", &csv, "--client", "Acme Corp", "--export", "md"],
    );
    assert!(stdout.contains("**Filters:** client ACME"));
    assert!(stdout.contains("| Tickets | 5 |"));
}
