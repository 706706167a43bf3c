use anyhow::Result;

use crate::{CliTest, output_text};

#[test]
fn test_formats_lists_capabilities() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("formats").output()?;
    let (stdout, _) = output_text(&output);

    assert!(output.status.success());
    let line = |suffix: &str| {
        stdout
            .lines()
            .find(|line| line.split_whitespace().next() == Some(suffix))
            .map(|line| line[suffix.len()..].trim().to_string())
    };
    assert_eq!(line(".php").as_deref(), Some("scan, load, generate"));
    assert_eq!(line(".phtml").as_deref(), Some("scan, load, generate"));
    assert_eq!(line(".blade.php").as_deref(), Some("scan"));
    assert_eq!(line(".po").as_deref(), Some("load, generate"));
    assert_eq!(line(".mo").as_deref(), Some("load, generate"));
    assert_eq!(line(".jed.json").as_deref(), Some("load, generate"));

    Ok(())
}
