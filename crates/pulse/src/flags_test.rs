use clap::Parser;
use pulse_config::ConfigView;

use super::*;

fn parse(args: &[&str]) -> Flags {
    Flags::try_parse_from(std::iter::once("pulse").chain(args.iter().copied())).unwrap()
}

fn view_for(args: &[&str]) -> ConfigView {
    let mut view = ConfigView::new();
    parse(args).apply(&mut view);
    view
}

#[test]
fn maps_basic_flags_into_view() {
    let view = view_for(&[
        "--entity",
        "testdata/main.go",
        "--category",
        "debugging",
        "--time",
        "1585598059.1",
        "--key",
        "00000000-0000-4000-8000-000000000000",
        "--plugin",
        "plugin/0.0.1",
    ]);

    assert_eq!(
        view.first_string(&["entity"]),
        Some("testdata/main.go".to_string())
    );
    assert_eq!(view.first_string(&["category"]), Some("debugging".to_string()));
    assert_eq!(view.first_float(&["time"]), Some(1585598059.1));
    assert_eq!(
        view.first_string(&["key"]),
        Some("00000000-0000-4000-8000-000000000000".to_string())
    );
    assert_eq!(view.first_string(&["plugin"]), Some("plugin/0.0.1".to_string()));
}

#[test]
fn bare_write_flag_means_true() {
    let view = view_for(&["--entity", "a.go", "--write"]);
    assert_eq!(view.first_bool(&["write"]), Some(true));
}

#[test]
fn write_flag_accepts_explicit_value() {
    let view = view_for(&["--entity", "a.go", "--write", "false"]);
    assert_eq!(view.first_bool(&["write"]), Some(false));
}

#[test]
fn absent_flags_leave_no_keys() {
    let view = view_for(&["--entity", "a.go"]);

    assert!(view.first(&["write"]).is_none());
    assert!(view.first(&["hide-branch-names"]).is_none());
    assert!(view.first(&["exclude"]).is_none());
    assert!(view.first(&["time"]).is_none());
}

#[test]
fn bare_hide_flag_becomes_true_string() {
    let view = view_for(&["--entity", "a.go", "--hide-file-names"]);
    assert_eq!(
        view.first_string(&["hide-file-names"]),
        Some("true".to_string())
    );
}

#[test]
fn hide_flag_accepts_pattern_value() {
    let view = view_for(&["--entity", "a.go", "--hide-branch-names", "fix.*"]);
    assert_eq!(
        view.first_string(&["hide-branch-names"]),
        Some("fix.*".to_string())
    );
}

#[test]
fn repeated_exclude_flags_accumulate() {
    let view = view_for(&[
        "--entity", "a.go", "--exclude", "/tmp/", "--exclude", "/var/",
    ]);

    assert_eq!(
        view.first_string_list(&["exclude"]),
        Some(vec!["/tmp/".to_string(), "/var/".to_string()])
    );
}

#[test]
fn verbose_is_only_set_when_passed() {
    let view = view_for(&["--entity", "a.go", "--verbose"]);
    assert_eq!(view.first_bool(&["verbose"]), Some(true));

    let view = view_for(&["--entity", "a.go"]);
    assert!(view.first(&["verbose"]).is_none());
}

#[test]
fn deprecated_aliases_parse() {
    let view = view_for(&[
        "--file",
        "a.go",
        "--apiurl",
        "http://localhost:8080",
        "--disableoffline",
        "--hidefilenames",
    ]);

    assert_eq!(view.first_string(&["file"]), Some("a.go".to_string()));
    assert_eq!(
        view.first_string(&["apiurl"]),
        Some("http://localhost:8080".to_string())
    );
    assert_eq!(view.first_bool(&["disableoffline"]), Some(true));
    assert_eq!(view.first_string(&["hidefilenames"]), Some("true".to_string()));
}
