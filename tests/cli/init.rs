use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::{CliTest, output_text};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["sources"][0]["path"], "src");
    assert_eq!(parsed["domains"][0]["name"], "messages");
    assert_eq!(parsed["domains"][0]["targets"][0], "locale/messages.pot");
    assert!(
        parsed.get("ignores").is_some(),
        "Config should have 'ignores' field"
    );
    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .msgsyncrc.json

    ----- stderr -----
    ");

    assert!(test.root().join(".msgsyncrc.json").exists());
    let content = test.read_file(".msgsyncrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".msgsyncrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    let (stdout, stderr) = output_text(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.is_empty());
    assert_eq!(stderr, "error: .msgsyncrc.json already exists\n");
    assert_eq!(test.read_file(".msgsyncrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("src/index.php", "<?php echo __('Welcome');\n")?;

    let output = test.sync_command().output()?;
    assert!(
        output.status.success(),
        "Sync should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let pot = test.read_file("locale/messages.pot")?;
    assert!(pot.contains("#: src/index.php:1\nmsgid \"Welcome\"\n"));

    Ok(())
}
