//! dockerhub-clean binary behavior.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;

fn dockerhub_clean() -> Command {
    let mut cmd = Command::cargo_bin("dockerhub-clean").unwrap();
    for var in [
        "DRY_RUN",
        "DOCKER_HUB_USERNAME",
        "DOCKER_HUB_PASSWORD",
        "DAYS_SINCE_LAST_ACTIVE",
        "DOCKER_HUB_NAMESPACE",
        "DOCKER_HUB_REPOSITORIES",
        "DOCKER_HUB_API_URL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn missing_credentials_fail() {
    dockerhub_clean()
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOCKER_HUB_USERNAME").or(predicate::str::contains("--username")));
}

#[test]
fn rejected_login_is_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v2/users/login");
        then.status(401);
    });
    let listing = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({"next": null, "results": []}));
    });

    dockerhub_clean()
        .env("DOCKER_HUB_USERNAME", "user")
        .env("DOCKER_HUB_PASSWORD", "wrong")
        .env("DOCKER_HUB_API_URL", server.base_url())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to get bearer token"));

    listing.assert_calls(0);
}

#[test]
fn dry_run_reports_and_succeeds() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v2/users/login");
        then.status(200).json_body(json!({"token": "tok"}));
    });
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({"count": 0, "next": null, "results": []}));
    });

    dockerhub_clean()
        .env("DOCKER_HUB_USERNAME", "user")
        .env("DOCKER_HUB_PASSWORD", "secret")
        .env("DOCKER_HUB_API_URL", server.base_url())
        .env("DOCKER_HUB_REPOSITORIES", "rstudio-connect")
        .assert()
        .success()
        .stderr(predicate::str::contains("No images will be deleted"))
        .stderr(predicate::str::contains("no images matched the deletion criteria"));
}

#[test]
fn deletion_reports_total() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v2/users/login");
        then.status(200).json_body(json!({"token": "tok"}));
    });
    let images: Vec<_> = (0..30)
        .map(|i| {
            json!({
                "namespace": "rstudio",
                "repository": "rstudio-connect",
                "digest": format!("sha256:{:064}", i),
                "status": "inactive",
                "tags": [{"tag": format!("v{}", i), "is_current": false}],
            })
        })
        .collect();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v2/namespaces/rstudio/repositories/rstudio-connect/images");
        then.status(200)
            .json_body(json!({"count": 30, "next": null, "results": images}));
    });
    let delete = server.mock(|when, then| {
        when.method(POST)
            .path("/v2/namespaces/rstudio/delete-images")
            .json_body_includes(json!({"dry_run": false}).to_string());
        then.status(200).json_body(json!({}));
    });

    dockerhub_clean()
        .env("DRY_RUN", "0")
        .env("DOCKER_HUB_USERNAME", "user")
        .env("DOCKER_HUB_PASSWORD", "secret")
        .env("DOCKER_HUB_API_URL", server.base_url())
        .env("DOCKER_HUB_REPOSITORIES", "rstudio-connect")
        .assert()
        .success()
        .stderr(predicate::str::contains("Successfully deleted 30 total images from rstudio-connect"))
        .stderr(predicate::str::contains("No images will be deleted").not());

    delete.assert_calls(2);
}
