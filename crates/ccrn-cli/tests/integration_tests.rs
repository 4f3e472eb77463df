//! Integration tests for CLI commands

use std::process::Command;

/// Helper to run the ccrn binary
fn ccrn(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ccrn"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute ccrn")
}

/// Get the fixtures path
fn fixtures_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")
}

fn crd_dir() -> String {
    format!("{}/crds", fixtures_path())
}

const POD: &str =
    "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=eu-de-1, namespace=default, name=my-pod";
const POD_URN: &str = "urn:ccrn:pod.k8s-registry.tr.ccrn.example.com/v1/eu-de-1/default/my-pod";

mod validate_command {
    use super::*;

    #[test]
    fn test_validate_field_list() {
        let output = ccrn(&["validate", POD, "--crd-dir", &crd_dir()]);

        assert!(output.status.success(), "Expected success for valid input");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Valid CCRN"));
        assert!(stdout.contains("pod.k8s-registry.tr.ccrn.example.com/v1"));
        assert!(stdout.contains("cluster = eu-de-1"));
    }

    #[test]
    fn test_validate_urn() {
        let output = ccrn(&["--crd-dir", &crd_dir(), "validate", POD_URN]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Valid URN"));
    }

    #[test]
    fn test_validate_with_glob_pattern() {
        let pattern = format!("{}/crds/testpod*.yaml", fixtures_path());
        let output = ccrn(&["validate", POD, "--crds", &pattern]);
        assert!(output.status.success());
    }

    #[test]
    fn test_validate_schema_violation() {
        let output = ccrn(&[
            "validate",
            "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=EU_DE, namespace=default, name=my-pod",
            "--crd-dir",
            &crd_dir(),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Invalid resource name"));
    }

    #[test]
    fn test_validate_unknown_type() {
        let output = ccrn(&[
            "validate",
            "ccrn=nothing.tr.ccrn.example.com/v1, name=x",
            "--crd-dir",
            &crd_dir(),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("unsupported resource type"));
    }

    #[test]
    fn test_validate_json_output() {
        let output = ccrn(&["validate", POD, "--crd-dir", &crd_dir(), "--json"]);

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        assert_eq!(json["valid"], true);
        assert_eq!(json["parsedResource"]["format"], "CCRN");
        assert_eq!(json["parsedResource"]["fields"]["name"], "my-pod");
    }

    #[test]
    fn test_validate_json_output_with_errors() {
        let output = ccrn(&[
            "validate",
            "arn:aws:s3:::bucket",
            "--crd-dir",
            &crd_dir(),
            "--json",
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "UnknownFormat");
        assert!(!json["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_validate_with_template() {
        let output = ccrn(&[
            "validate",
            POD_URN,
            "--template",
            "urn:ccrn:<ccrn>/<cluster>/<namespace>/<name>",
            "--crd-dir",
            &crd_dir(),
        ]);
        assert!(output.status.success());

        let output = ccrn(&[
            "validate",
            POD_URN,
            "--template",
            "urn:ccrn:<ccrn>/<cluster>/<namespace>/<name>/<extra>",
            "--crd-dir",
            &crd_dir(),
        ]);
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_validate_other_authority() {
        let output = ccrn(&[
            "validate",
            POD,
            "--crd-dir",
            &crd_dir(),
            "--authority",
            "example.org",
        ]);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod convert_command {
    use super::*;

    #[test]
    fn test_convert_field_list() {
        let output = ccrn(&["convert", POD, "--crd-dir", &crd_dir()]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(POD_URN));
    }

    #[test]
    fn test_convert_urn_json() {
        let output = ccrn(&["convert", POD_URN, "--crd-dir", &crd_dir(), "--json"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        assert_eq!(
            json["fieldList"],
            "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=eu-de-1, name=my-pod, namespace=default"
        );
        assert_eq!(json["urn"], POD_URN);
    }

    #[test]
    fn test_convert_type_without_template() {
        let output = ccrn(&[
            "convert",
            "ccrn=testurn2.tr.ccrn.example.com/v1, name=x",
            "--crd-dir",
            &crd_dir(),
            "--json",
        ]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert!(json["urn"].is_null());
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_convert_invalid_input() {
        let output = ccrn(&["convert", "ccrn=", "--crd-dir", &crd_dir()]);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod types_command {
    use super::*;

    #[test]
    fn test_types_list() {
        let output = ccrn(&["types", "--crd-dir", &crd_dir()]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("4 resource type(s)"));
        assert!(stdout.contains("testurn.tr.ccrn.example.com/v1"));
        assert!(!stdout.contains("widget"));
    }

    #[test]
    fn test_types_json() {
        let output = ccrn(&["types", "--crd-dir", &crd_dir(), "--json"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        let types = json.as_array().unwrap();

        let keys: Vec<&str> = types
            .iter()
            .map(|t| t["typeKey"].as_str().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "pod.k8s-registry.tr.ccrn.example.com/v1",
                "testresource.tr.ccrn.example.com/v1",
                "testurn.tr.ccrn.example.com/v1",
                "testurn2.tr.ccrn.example.com/v1",
            ]
        );
        assert_eq!(
            types[0]["urnTemplate"],
            "urn:ccrn:<ccrn>/<cluster>/<namespace>/<name>"
        );
        assert!(types[3].get("urnTemplate").is_none());
        assert!(types.iter().all(|t| t["validator"] == true));
    }

    #[test]
    fn test_types_from_config() {
        let config = format!("{}/config/static.yaml", fixtures_path());
        let output = ccrn(&["types", "--config", &config, "--json"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn test_no_source_is_usage_error() {
        let output = ccrn(&["validate", POD]);

        assert_eq!(output.status.code(), Some(64));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no type definitions"));
    }

    #[test]
    fn test_pattern_without_matches_is_io_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let pattern = format!("{}/*.yaml", temp.path().display());
        let output = ccrn(&["types", "--crds", &pattern]);

        assert_eq!(output.status.code(), Some(5));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("IO error"));
    }

    #[test]
    fn test_live_conflicts_with_files() {
        let output = ccrn(&["types", "--live", "--crd-dir", &crd_dir()]);
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("cannot be used with"));
    }
}
