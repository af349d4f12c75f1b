use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const AUDIT: &str = r#"<check_type:"Unix">
<custom_item>
  type        : CMD_EXEC
  description : "1.1 Ensure SSH root login is disabled"
  cmd         : "sshd -T | grep permitrootlogin"
</custom_item>
<condition type:"or">
  <item>
    description : '1.2 Ensure message of the day is configured'
  </item>
</condition>
</check_type>
"#;

const REPORT: &str = r#"<?xml version="1.0" ?>
<NessusClientData_v2 xmlns:cm="http://www.nessus.org/cm">
  <Report name="baseline">
    <ReportHost name="web01">
      <ReportItem pluginID="21157">
        <cm:compliance-check-name>1.1 Ensure SSH root login is disabled</cm:compliance-check-name>
        <cm:compliance-actual-value>permitrootlogin no</cm:compliance-actual-value>
      </ReportItem>
      <ReportItem pluginID="21157">
        <cm:compliance-check-name>1.2 Ensure message of the day is configured</cm:compliance-check-name>
        <cm:compliance-actual-value>Authorized "users" only</cm:compliance-actual-value>
      </ReportItem>
    </ReportHost>
    <ReportHost name="db01">
      <ReportItem pluginID="21157">
        <cm:compliance-check-name>1.1 Ensure SSH root login is disabled</cm:compliance-check-name>
        <cm:compliance-actual-value>permitrootlogin yes</cm:compliance-actual-value>
      </ReportItem>
    </ReportHost>
  </Report>
</NessusClientData_v2>
"#;

fn cmd() -> Command {
    Command::cargo_bin("baseline-cli").expect("binary built")
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let workspace = Self { dir };
        workspace.write("policy.audit", AUDIT);
        workspace.write("scan.nessus", REPORT);
        workspace
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("output readable")
    }

    fn run(&self, extra: &[&str], report: &str) -> assert_cmd::assert::Assert {
        cmd()
            .args(extra)
            .arg(self.path("policy.audit"))
            .arg(self.path(report))
            .assert()
    }
}

fn without_known_good(text: &str) -> Vec<&str> {
    text.split('\n')
        .filter(|line| !line.contains("known_good"))
        .collect()
}

#[test]
fn writes_one_baseline_per_host() {
    let ws = Workspace::new();
    ws.run(&[], "scan.nessus")
        .success()
        .stdout(contains("Done"))
        .stdout(contains("web01"));

    let web = ws.read("policy.web01.audit");
    assert!(web.contains(
        "  cmd         : \"sshd -T | grep permitrootlogin\"\n  known_good : \"permitrootlogin no\"\n</custom_item>"
    ));
    assert!(web.contains(
        "    known_good : 'Authorized \"users\" only'\n  </item>"
    ));

    let db = ws.read("policy.db01.audit");
    assert!(db.contains("  known_good : \"permitrootlogin yes\"\n</custom_item>"));
    assert_eq!(db.matches("known_good").count(), 1);

    assert_eq!(without_known_good(&web), without_known_good(AUDIT));
    assert_eq!(without_known_good(&db), without_known_good(AUDIT));
}

#[test]
fn existing_output_requires_overwrite() {
    let ws = Workspace::new();
    ws.write("policy.web01.audit", "keep me");

    ws.run(&[], "scan.nessus")
        .failure()
        .stderr(contains("file exists"));
    assert_eq!(ws.read("policy.web01.audit"), "keep me");

    ws.run(&["--overwrite"], "scan.nessus").success();
    assert!(ws.read("policy.web01.audit").contains("known_good"));
}

#[test]
fn filename_override_is_shared_by_all_hosts() {
    let ws = Workspace::new();
    let target = ws.path("custom.audit");
    let target_arg = target.to_string_lossy().to_string();

    ws.run(&["-f", &target_arg], "scan.nessus")
        .failure()
        .stderr(contains("share the override path"))
        .stderr(contains("file exists"));

    ws.run(&["-o", "-f", &target_arg], "scan.nessus").success();
    let written = ws.read("custom.audit");
    assert!(written.contains("permitrootlogin"));
    assert!(!Path::new(&ws.path("policy.web01.audit")).exists());
}

#[test]
fn json_summary_lists_outputs() {
    let ws = Workspace::new();
    let out = ws
        .run(&["--format", "json", "--verbose", "--timestamp"], "scan.nessus")
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: Value = serde_json::from_slice(&out).expect("valid json output");
    assert_eq!(summary["hosts"], 2);
    let outputs = summary["outputs"].as_array().expect("outputs array");
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0]["host"], "db01");
    assert_eq!(outputs[0]["inserted"], 1);
    assert_eq!(outputs[1]["host"], "web01");
    assert_eq!(outputs[1]["inserted"], 2);
    assert_eq!(outputs[1]["inserted_in_conditions"], 1);
}

#[test]
fn malformed_report_is_fatal() {
    let ws = Workspace::new();
    ws.write("broken.nessus", "<NessusClientData_v2><Report>");

    ws.run(&[], "broken.nessus")
        .failure()
        .stderr(contains("broken.nessus"));
    assert!(!ws.path("policy.web01.audit").exists());
}

#[test]
fn missing_host_name_is_fatal() {
    let ws = Workspace::new();
    ws.write(
        "nameless.nessus",
        "<NessusClientData_v2><Report><ReportHost></ReportHost></Report></NessusClientData_v2>",
    );

    ws.run(&[], "nameless.nessus")
        .failure()
        .stderr(contains("missing the 'name' attribute"));
}

#[test]
fn unquotable_value_is_fatal() {
    let ws = Workspace::new();
    ws.write(
        "quotes.nessus",
        r#"<r><Report><ReportHost name="h"><ReportItem>
<compliance-check-name>1.1 Ensure SSH root login is disabled</compliance-check-name>
<compliance-actual-value>it's "quoted"</compliance-actual-value>
</ReportItem></ReportHost></Report></r>"#,
    );

    ws.run(&[], "quotes.nessus")
        .failure()
        .stderr(contains("both quote characters"));
    assert!(!ws.path("policy.h.audit").exists());
}

#[test]
fn later_reports_win_per_host() {
    let ws = Workspace::new();
    ws.write(
        "rescan.nessus",
        r#"<r><Report><ReportHost name="db01"><ReportItem>
<compliance-check-name>1.1 Ensure SSH root login is disabled</compliance-check-name>
<compliance-actual-value>permitrootlogin prohibit-password</compliance-actual-value>
</ReportItem></ReportHost></Report></r>"#,
    );

    cmd()
        .arg(ws.path("policy.audit"))
        .arg(ws.path("scan.nessus"))
        .arg(ws.path("rescan.nessus"))
        .assert()
        .success();

    assert!(ws
        .read("policy.db01.audit")
        .contains("known_good : \"permitrootlogin prohibit-password\""));
    assert!(ws.path("policy.web01.audit").exists());
}

#[test]
fn missing_audit_file_is_reported() {
    let ws = Workspace::new();
    cmd()
        .arg(ws.path("absent.audit"))
        .arg(ws.path("scan.nessus"))
        .assert()
        .failure()
        .stderr(contains("absent.audit"));
}
