use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::{CliTest, output_text};

const CONFIG: &str = r#"{
  "sources": [{ "path": "src" }],
  "domains": [{ "name": "messages", "targets": ["locale/fr.po", "locale/fr.mo"] }],
  "headers": { "Language": "fr" }
}"#;

const EXISTING_PO: &str = r#"msgid ""
msgstr ""
"Language: fr\n"

#: src/old.php:1
msgid "Bonjour"
msgstr "Salut"

msgid "Hello"
msgstr "Bonjour"
"#;

fn project() -> Result<CliTest> {
    let test = CliTest::with_file(".msgsyncrc.json", CONFIG)?;
    test.write_file(
        "src/index.php",
        "<?php\n// i18n: greeting\n echo __('Hello');\n",
    )?;
    Ok(test)
}

#[test]
fn test_sync_creates_catalogs() -> Result<()> {
    let test = project()?;

    assert_cmd_snapshot!(test.sync_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote locale/fr.po
    ✓ Wrote locale/fr.mo
    ✓ Synced 1 domain from 1 source file

    ----- stderr -----
    ");

    let po = test.read_file("locale/fr.po")?;
    assert!(po.contains("\"Language: fr\\n\""));
    assert!(po.contains("#. i18n: greeting\n#: src/index.php:3\nmsgid \"Hello\"\nmsgstr \"\"\n"));
    assert!(test.root().join("locale/fr.mo").exists());

    Ok(())
}

#[test]
fn test_sync_keeps_translations_and_marks_obsolete() -> Result<()> {
    let test = project()?;
    test.write_file("locale/fr.po", EXISTING_PO)?;

    assert_cmd_snapshot!(test.sync_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote locale/fr.po
    ✓ Wrote locale/fr.mo
    ✓ Synced 1 domain from 1 source file

    ----- stderr -----
    ");

    let po = test.read_file("locale/fr.po")?;
    assert!(po.contains("#: src/index.php:3\nmsgid \"Hello\"\nmsgstr \"Bonjour\"\n"));
    assert!(po.contains("#~ msgid \"Bonjour\"\n#~ msgstr \"Salut\"\n"));

    Ok(())
}

#[test]
fn test_sync_purge_obsolete() -> Result<()> {
    let test = project()?;
    test.write_file("locale/fr.po", EXISTING_PO)?;

    assert_cmd_snapshot!(test.sync_command().arg("--purge-obsolete"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote locale/fr.po
    ✓ Wrote locale/fr.mo
    ✓ Synced 1 domain from 1 source file

    ----- stderr -----
    ");

    let po = test.read_file("locale/fr.po")?;
    assert!(po.contains("msgstr \"Bonjour\""));
    assert!(!po.contains("Salut"));

    Ok(())
}

#[test]
fn test_sync_is_stable() -> Result<()> {
    let test = project()?;
    test.write_file("locale/fr.po", EXISTING_PO)?;

    test.sync_command().output()?;
    let first = test.read_file("locale/fr.po")?;
    test.sync_command().output()?;
    let second = test.read_file("locale/fr.po")?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_sync_dry_run_writes_nothing() -> Result<()> {
    let test = project()?;

    assert_cmd_snapshot!(test.sync_command().arg("--dry-run"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Would write locale/fr.po
    ✓ Would write locale/fr.mo
    ✓ Synced 1 domain from 1 source file (dry run)

    ----- stderr -----
    ");
    assert!(!test.root().join("locale").exists());

    Ok(())
}

#[test]
fn test_sync_malformed_primary_is_left_alone() -> Result<()> {
    let test = project()?;
    test.write_file("locale/fr.po", "msgid \"unterminated\n")?;

    test.settings().bind(|| {
        assert_cmd_snapshot!(test.sync_command(), @r#"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        error: failed to load locale/fr.po (domain "messages")
          --> Failed to parse catalog: [ROOT]/locale/fr.po: line 1: malformed string "unterminated

        ✘ 1 target failed
        "#);
    });
    assert_eq!(test.read_file("locale/fr.po")?, "msgid \"unterminated\n");
    assert!(!test.root().join("locale/fr.mo").exists());

    Ok(())
}

#[test]
fn test_sync_routes_domains() -> Result<()> {
    let test = CliTest::with_file(".msgsyncrc.json", "{}")?;
    test.write_file(
        "app/page.js",
        "__('Home');\nd__('admin', 'Users');\nd__('billing', 'Invoices');\n",
    )?;

    let mut cmd = test.sync_command();
    cmd.args(["--source", "app"])
        .args(["--domain", "messages=locale/messages.pot"])
        .args(["--domain", "admin=locale/admin.pot"]);
    assert_cmd_snapshot!(cmd, @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote locale/messages.pot
    ✓ Wrote locale/admin.pot
    ✓ Synced 2 domains from 1 source file

    ----- stderr -----
    warning: strings for undeclared domain "billing" were ignored
    "#);

    let messages = test.read_file("locale/messages.pot")?;
    let admin = test.read_file("locale/admin.pot")?;
    assert!(messages.contains("msgid \"Home\""));
    assert!(!messages.contains("Users"));
    assert!(admin.contains("#: app/page.js:2\nmsgid \"Users\""));
    assert!(!admin.contains("Home"));

    Ok(())
}

#[test]
fn test_sync_unknown_default_domain() -> Result<()> {
    let test = project()?;

    assert_cmd_snapshot!(test.sync_command().args(["--default-domain", "nope"]), @r#"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    error: default domain "nope" is not declared
    "#);
    assert!(!test.root().join("locale").exists());

    Ok(())
}

#[test]
fn test_sync_invalid_config_file() -> Result<()> {
    let test = CliTest::with_file(".msgsyncrc.json", "{ not json")?;

    let output = test.sync_command().output()?;
    let (_, stderr) = output_text(&output);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.starts_with("error: Failed to parse config file:"));

    Ok(())
}

#[test]
fn test_sync_php_array_target() -> Result<()> {
    let test = CliTest::with_file(
        ".msgsyncrc.json",
        r#"{
  "sources": [{ "path": "src" }],
  "domains": [{ "name": "messages", "targets": ["locale/fr.php"] }]
}"#,
    )?;
    test.write_file("src/index.php", "<?php\necho __('Hello');\necho __('Welcome');\n")?;
    test.write_file(
        "locale/fr.php",
        "<?php\n\nreturn [\n    'messages' => [\n        '' => ['Hello' => 'Bonjour'],\n    ],\n];\n",
    )?;

    assert_cmd_snapshot!(test.sync_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote locale/fr.php
    ✓ Synced 1 domain from 1 source file

    ----- stderr -----
    ");

    let php = test.read_file("locale/fr.php")?;
    assert!(php.starts_with("<?php\n\nreturn [\n"));
    assert!(php.contains("'Hello' => 'Bonjour',"));
    assert!(!php.contains("Welcome"));

    Ok(())
}
