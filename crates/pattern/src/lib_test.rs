use super::*;

#[test]
fn compiles_standard_pattern() {
    let pattern = Pattern::compile("wakatime.*").unwrap();
    assert!(matches!(pattern, Pattern::Standard(_)));
    assert!(pattern.is_match("wakatime-sync"));
    assert!(!pattern.is_match("other"));
}

#[test]
fn falls_back_for_negative_lookahead() {
    let pattern = Pattern::compile(r"^/var/(?!www/).*").unwrap();
    assert!(matches!(pattern, Pattern::Lookaround(_)));
    assert!(pattern.is_match("/var/log/syslog"));
    assert!(!pattern.is_match("/var/www/index.html"));
}

#[test]
fn falls_back_for_positive_lookahead() {
    let pattern = Pattern::compile(r"^/var/(?=www/).*").unwrap();
    assert!(matches!(pattern, Pattern::Lookaround(_)));
    assert!(pattern.is_match("/var/www/index.html"));
    assert!(!pattern.is_match("/var/log/syslog"));
}

#[test]
fn rejects_invalid_pattern() {
    let err = Pattern::compile("[0-9+").unwrap_err();
    assert!(err.to_string().contains("[0-9+"));
}

#[test]
fn preserves_source_text() {
    let source = r"^/home/user/projects/bar(\d+)/";
    let pattern = Pattern::compile(source).unwrap();
    assert_eq!(pattern.as_str(), source);
    assert_eq!(pattern.to_string(), source);
}

#[test]
fn captures_groups_without_whole_match() {
    let pattern = Pattern::compile(r"^/projects/(\w+)/(\d+)$").unwrap();
    let caps = pattern.captures("/projects/billing/42").unwrap();
    assert_eq!(caps, vec!["billing".to_string(), "42".to_string()]);
}

#[test]
fn captures_on_lookaround_engine() {
    let pattern = Pattern::compile(r"^/var/(?!www/)(\w+)/").unwrap();
    let caps = pattern.captures("/var/log/syslog").unwrap();
    assert_eq!(caps, vec!["log".to_string()]);
}

#[test]
fn equality_compares_sources() {
    let a = Pattern::compile("fix.*").unwrap();
    let b = Pattern::compile("fix.*").unwrap();
    let c = Pattern::compile("feat.*").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}
