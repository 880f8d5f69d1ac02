//! End-to-end parsing scenarios against the public API

use argspec::util::testing;
use argspec::{long_option, option, positional, short_option, Spec, UsageErrorKind};
use rstest::{fixture, rstest};

#[fixture]
fn long_and_arg() -> Spec {
    testing::init_test_setup();
    Spec::new(
        true,
        [
            option("-l", "--long").repeatable().parameter(positional("foo")),
            positional("arg"),
        ],
    )
    .unwrap()
}

#[fixture]
fn single_arg() -> Spec {
    Spec::new(true, [positional("arg")]).unwrap()
}

#[rstest]
fn given_repeated_option_with_parameter_when_parsing_then_one_subset_per_occurrence(
    long_and_arg: Spec,
) {
    // Act
    let result = long_and_arg.parse(["-l", "x", "-l", "y", "arg1"]).unwrap();

    // Assert
    assert!(result.has_option("--long"));
    let subsets = result.get_subsets("--long");
    assert_eq!(subsets.len(), 2);
    assert_eq!(subsets[0].get_value("foo"), Some("x"));
    assert_eq!(subsets[1].get_value("foo"), Some("y"));
    assert_eq!(result.get_value("arg"), Some("arg1"));
}

#[rstest]
fn given_extra_positional_when_parsing_then_unexpected_argument(single_arg: Spec) {
    let err = single_arg.parse(["arg1", "extra"]).unwrap_err();

    assert_eq!(err.to_string(), "Unexpected argument \"extra\".");
    assert!(err.spec().same_as(&single_arg));
}

#[rstest]
fn given_no_arguments_when_parsing_then_missing_required_argument(single_arg: Spec) {
    let err = single_arg.parse(Vec::<String>::new()).unwrap_err();

    assert_eq!(err.to_string(), "Missing required argument \"arg\".");
    assert_eq!(
        err.kind(),
        &UsageErrorKind::MissingRequiredArgument("arg".into())
    );
}

#[test]
fn given_missing_key_positional_then_message_quotes_label() {
    let spec = Spec::new(true, [positional("<key>"), positional("<value>").optional()]).unwrap();

    let err = spec.parse(Vec::<String>::new()).unwrap_err();

    assert_eq!(err.to_string(), "Missing required argument \"<key>\".");
}

#[test]
fn given_values_when_parsing_then_returned_in_encounter_order() {
    // Arrange
    let spec = Spec::new(
        true,
        [
            short_option("-I").optional().repeatable().parameter(positional("<dir>")),
            positional("<file>").repeatable(),
        ],
    )
    .unwrap();

    // Act
    let result = spec
        .parse(["a.c", "-Iinclude", "b.c", "-I", "vendor", "c.c"])
        .unwrap();

    // Assert
    assert_eq!(result.get_values("<file>"), ["a.c", "b.c", "c.c"]);
    assert_eq!(result.get_values("-I"), ["include", "vendor"]);
}

fn env_with_formats() -> Spec {
    Spec::new(
        true,
        [option("-e", "--env")
            .optional()
            .repeatable()
            .parameter(long_option("--json").optional().exclusion_group("format"))
            .parameter(long_option("--yaml").optional().exclusion_group("format"))],
    )
    .unwrap()
}

#[test]
fn given_group_members_in_different_occurrences_then_accepted() {
    let result = env_with_formats()
        .parse(["-e", "--json", "-e", "--yaml"])
        .unwrap();

    let subsets = result.get_subsets("--env");
    assert_eq!(subsets.len(), 2);
    assert!(subsets[0].has_option("--json"));
    assert!(!subsets[0].has_option("--yaml"));
    assert!(subsets[1].has_option("--yaml"));
}

#[test]
fn given_group_members_in_same_occurrence_then_rejected() {
    let err = env_with_formats()
        .parse(["-e", "--json", "--yaml"])
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Argument \"--yaml\" cannot be combined with \"--json\"."
    );
}

#[rstest]
#[case(&["-x"], "Unexpected option \"-x\".")]
#[case(&["--", "arg1"], "Unexpected option \"--\".")]
#[case(&["-l"], "Missing required argument \"foo\".")]
#[case(&["--long=x", "a", "b"], "Unexpected argument \"b\".")]
fn given_malformed_arguments_then_fails_fast(
    long_and_arg: Spec,
    #[case] args: &[&str],
    #[case] message: &str,
) {
    let err = long_and_arg.parse(args.iter().copied()).unwrap_err();
    assert_eq!(err.to_string(), message);
}

#[test]
fn given_shared_spec_when_parsing_concurrently_then_results_are_independent() {
    let spec = Spec::new(true, [positional("<n>")]).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let spec = spec.clone();
            std::thread::spawn(move || {
                spec.parse([i.to_string()])
                    .map(|r| r.get_value("<n>").map(str::to_string))
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.join().unwrap().unwrap();
        assert_eq!(value, Some(i.to_string()));
    }
}
