//! CLI tests for the ddt-keywords binary

use std::io::Write;
use std::process::{Command, Output};

/// Execute the ddt-keywords CLI and return the output
fn execute_ddt_keywords(args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_ddt-keywords"))
        .args(args)
        .env("RUST_LOG", "ddt_keywords=debug")
        .env_remove("DDT_ZONE_POLICY")
        .env_remove("DDT_SYSTEM_ZONE")
        .env_remove("DDT_SEED")
        .output()?;
    Ok(output)
}

/// Verify CLI command succeeded
fn assert_cli_success(output: &Output, command_desc: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "{} failed!\nExit code: {:?}\nStdout: {}\nStderr: {}",
            command_desc,
            output.status.code(),
            stdout,
            stderr
        );
    }
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_generate_count() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_ddt_keywords(&[
        "generate",
        "[randstring{length=5}{numeric}]",
        "--count",
        "20",
    ])?;
    assert_cli_success(&output, "generate numeric strings");

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 20);
    for line in lines {
        assert_eq!(line.len(), 5);
        assert!(line.chars().all(|c| c.is_ascii_digit()), "{line}");
    }
    Ok(())
}

#[test]
fn test_generate_with_seed_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
    let args = [
        "generate",
        "[randint{range=-1000:1000}{odd}]",
        "[randstring{length=8}]",
        "--count",
        "3",
        "--seed",
        "42",
    ];
    let first = execute_ddt_keywords(&args)?;
    let second = execute_ddt_keywords(&args)?;
    assert_cli_success(&first, "first seeded run");
    assert_cli_success(&second, "second seeded run");

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(stdout_lines(&first).len(), 6);
    Ok(())
}

#[test]
fn test_generate_json() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_ddt_keywords(&[
        "generate",
        "[datetime{start=2016-04-12T13:06:04-04:00[America/New_York]}{+1d}]",
        "[randint{range=1:3}]",
        "--format",
        "json",
    ])?;
    assert_cli_success(&output, "generate json");

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);

    let datetime: serde_json::Value = serde_json::from_str(&lines[0])?;
    assert_eq!(datetime["type"], "date_time");
    assert_eq!(
        datetime["value"],
        "2016-04-13T13:06:04-04:00[America/New_York]"
    );

    let integer: serde_json::Value = serde_json::from_str(&lines[1])?;
    assert_eq!(integer["keyword"], "[randint{range=1:3}]");
    assert_eq!(integer["type"], "integer");
    assert!((1..=3).contains(&integer["value"].as_i64().unwrap()));
    Ok(())
}

#[test]
fn test_generate_system_zone_policy() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_ddt_keywords(&[
        "generate",
        "[datetime{start=2016-04-12T13:06:04-04:00[America/New_York]}]",
        "--zone-policy",
        "system",
        "--system-zone",
        "UTC",
    ])?;
    assert_cli_success(&output, "generate in system zone");

    assert_eq!(stdout_lines(&output), vec!["2016-04-12T17:06:04+00:00[UTC]"]);
    Ok(())
}

#[test]
fn test_generate_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("keywords.txt");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "[randint{{range=10:20}}{{even}}]")?;
    writeln!(file)?;
    writeln!(file, "[randstring{{include=[xy]}}{{length=4}}]")?;
    drop(file);

    let output = execute_ddt_keywords(&["generate", "--file", path.to_str().unwrap()])?;
    assert_cli_success(&output, "generate from file");

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    let int: i64 = lines[0].parse()?;
    assert!((10..=20).contains(&int) && int % 2 == 0);
    assert!(lines[1].len() == 4 && lines[1].chars().all(|c| c == 'x' || c == 'y'));
    Ok(())
}

#[test]
fn test_generate_invalid_keyword_fails() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_ddt_keywords(&["generate", "[randint{range=1:5}{bogus}]"])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("{bogus}"), "{stderr}");
    Ok(())
}

#[test]
fn test_check_reports_families() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_ddt_keywords(&["check", "[randstring]", "[datetime{+1d}]"])?;
    assert_cli_success(&output, "check families");

    assert_eq!(
        stdout_lines(&output),
        vec!["randstring\t[randstring]", "datetime\t[datetime{+1d}]"]
    );
    Ok(())
}

#[test]
fn test_check_validate_flags_invalid() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_ddt_keywords(&[
        "check",
        "--validate",
        "[randint{range=1:5}]",
        "[randint{even}{odd}]",
        "not a keyword",
    ])?;

    assert!(!output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "randint\t[randint{range=1:5}]\tok");
    assert!(lines[1].starts_with("randint\t[randint{even}{odd}]\tinvalid: "));
    assert_eq!(lines[2], "none\tnot a keyword");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 of 3 keyword strings are invalid"), "{stderr}");
    Ok(())
}
