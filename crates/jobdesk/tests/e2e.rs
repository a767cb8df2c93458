//! End-to-end tests for the jobdesk CLI.
//!
//! Each test runs the real binary against an in-process mock backend, with
//! the session file and config isolated in a temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

mod common;

use common::{MockServer, Recorded};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    /// The binary with every setting pinned to this sandbox.
    #[allow(deprecated)]
    fn cmd(&self, base_url: &str) -> Command {
        let mut cmd = Command::cargo_bin("jobdesk").unwrap();
        cmd.env("JOBDESK_BASE_URL", base_url)
            .env("JOBDESK_SESSION_FILE", self.dir.path().join("session.json"))
            .env("JOBDESK_CONFIG", self.dir.path().join("config.toml"))
            .env("JOBDESK_TODAY", "15/06/2024")
            .env_remove("JOBDESK_PAGE_SIZE")
            .env_remove("JOBDESK_TIMEOUT_SECS")
            .env_remove("JOBDESK_PASSWORD")
            .env_remove("RUST_LOG")
            .arg("--no-color");
        cmd
    }

    fn login(&self, server: &MockServer) {
        self.cmd(&server.url())
            .args(["login", "-u", "asha", "--password", "Secret1!"])
            .assert()
            .success();
    }
}

fn backend(position: &'static str) -> MockServer {
    MockServer::start(move |req: &Recorded| match req.path.as_str() {
        "/login" => (
            200,
            json!({"jwtToken": "tok", "userId": 1, "userName": "asha", "name": "Asha", "position": position})
                .to_string(),
        ),
        "/allData" => (
            200,
            json!([
                {"JOB_ID": "iTek2406001", "NAME": "Ravi", "MOBILE": "9876543210", "IN_DATE": "03/06/2024", "JOB_STATUS": "Pending", "AMOUNT": 500},
                {"JOB_ID": "iTek2406002", "NAME": "Meena", "MOBILE": "9123456780", "IN_DATE": "04/06/2024", "JOB_STATUS": "Delivered"},
            ])
            .to_string(),
        ),
        "/jobID" => (200, json!({"JOB_ID": "iTek2406002"}).to_string()),
        "/jobSheetPickers" => (200, json!({"engineers": ["Ravi"]}).to_string()),
        "/logout" => (200, "{}".to_string()),
        _ => (404, json!({"message": "no such route"}).to_string()),
    })
    .unwrap()
}

// =============================================================================
// Offline commands
// =============================================================================

mod offline {
    use super::*;

    #[test]
    fn range_resolves_named_keyword() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd("http://127.0.0.1:9")
            .args(["range", "This Month"])
            .assert()
            .success()
            .stdout("01/06/2024 - 30/06/2024\n");
    }

    #[test]
    fn range_lists_all_keywords() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd("http://127.0.0.1:9")
            .arg("range")
            .assert()
            .success()
            .stdout(predicate::str::contains("This Financial Year"))
            .stdout(predicate::str::contains("10/06/2024 - 16/06/2024"));
    }

    #[test]
    fn unknown_range_is_rejected() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd("http://127.0.0.1:9")
            .args(["range", "Next Decade"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown date range"));
    }

    #[test]
    fn jobs_require_login() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd("http://127.0.0.1:9")
            .args(["jobs", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error: not logged in"));
    }
}

// =============================================================================
// Against the mock backend
// =============================================================================

mod online {
    use super::*;

    #[test]
    fn login_then_list_jobs() {
        let server = backend("ADMIN");
        let sandbox = Sandbox::new();

        sandbox
            .cmd(&server.url())
            .args(["login", "-u", "asha", "--password", "Secret1!"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Signed in as Asha (admin)"));
        assert!(sandbox.dir.path().join("session.json").exists());

        sandbox
            .cmd(&server.url())
            .args(["jobs", "list", "--range", "This Month"])
            .assert()
            .success()
            .stdout(predicate::str::contains("iTek2406001"))
            .stdout(predicate::str::contains("Page 1 of 1 (2 jobs)"))
            .stdout(predicate::str::contains("Actions: View, Edit, Delete"));

        let list = &server.requests_to("/allData")[0];
        assert_eq!(list.header("authorization"), Some("Bearer tok"));
        assert!(list.query.starts_with("inDateFrom=01%2F06%2F2024&inDateTo=30%2F06%2F2024"));
    }

    #[test]
    fn search_narrows_the_table() {
        let server = backend("USER");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .args(["jobs", "list", "-s", "meena"])
            .assert()
            .success()
            .stdout(predicate::str::contains("iTek2406002"))
            .stdout(predicate::str::contains("iTek2406001").not())
            .stdout(predicate::str::contains("Page 1 of 1 (1 job)"))
            .stdout(predicate::str::contains("Actions: View, Edit\n"));
    }

    #[test]
    fn next_id_follows_last_issued() {
        let server = backend("ADMIN");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .args(["jobs", "next-id"])
            .assert()
            .success()
            .stdout("iTek2406003\n");
    }

    #[test]
    fn non_admin_cannot_manage_users() {
        let server = backend("USER");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .args(["users", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error: Unauthorized access"));
        assert!(server.requests_to("/userList").is_empty());
    }

    #[test]
    fn delete_needs_confirmation() {
        let server = backend("ADMIN");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .args(["jobs", "delete", "iTek2406001"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("without --yes"));
        assert!(server.requests_to("/deleteJob").is_empty());
    }

    #[test]
    fn backend_error_message_is_shown() {
        let server = backend("ADMIN");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .args(["pickers", "category", "FAULT"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error: no such route"));
    }

    #[test]
    fn logout_removes_session() {
        let server = backend("ADMIN");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .arg("logout")
            .assert()
            .success()
            .stdout(predicate::str::contains("Signed out"));
        assert!(!sandbox.dir.path().join("session.json").exists());
        assert_eq!(server.requests_to("/logout")[0].json()["USERNAME"], "asha");
    }

    #[test]
    fn invalid_job_sheet_is_not_sent() {
        let server = backend("ADMIN");
        let sandbox = Sandbox::new();
        sandbox.login(&server);

        sandbox
            .cmd(&server.url())
            .args(["jobs", "create", "--customer", "Ravi", "--mobile", "12345"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Enter Valid Mobile Number"));
        assert!(server.requests_to("/insert").is_empty());
    }
}
