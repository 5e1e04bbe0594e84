use clap::Parser;
use nextkit::cli::Args;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("nextkit")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./demo"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.target, Some(PathBuf::from("./demo")));
    assert_eq!(parsed.template, "nextjs");
    assert_eq!(parsed.name, None);
    assert!(!parsed.overwrite);
    assert!(!parsed.skip_tests);
    assert!(!parsed.verbose);
    assert!(parsed.vars.is_empty());
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--name",
        "Demo App",
        "--description",
        "A demo",
        "--author",
        "Sam",
        "--var",
        "port=4000",
        "--var",
        "region=eu",
        "--template",
        "./my-template",
        "--overwrite",
        "--skip-tests",
        "--stdin",
        "--verbose",
        "./demo",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.name.as_deref(), Some("Demo App"));
    assert_eq!(parsed.vars, vec!["port=4000", "region=eu"]);
    assert_eq!(parsed.template, "./my-template");
    assert!(parsed.overwrite);
    assert!(parsed.skip_tests);
    assert!(parsed.stdin);
    assert!(parsed.verbose);

    let request = parsed.request().unwrap();
    assert_eq!(request.target, PathBuf::from("./demo"));
    assert_eq!(request.author.as_deref(), Some("Sam"));
    assert!(request.skip_tests);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-o", "-v", "-n", "shop", "./demo"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.overwrite);
    assert!(parsed.verbose);
    assert_eq!(parsed.name.as_deref(), Some("shop"));
}

#[test]
fn test_missing_target() {
    let args = make_args(&["--overwrite"]);
    let err = Args::try_parse_from(args).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_list_templates_needs_no_target() {
    let args = make_args(&["--list-templates"]);
    let parsed = Args::try_parse_from(args).unwrap();
    assert!(parsed.list_templates);
    assert!(parsed.request().is_none());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./demo", "extra"]);
    assert!(Args::try_parse_from(args).is_err());
}
