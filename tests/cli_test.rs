//! CLI argument parsing tests.

use clap::{CommandFactory, Parser};
use rstest::rstest;

use srview::cli::{Cli, Commands, ConfigCommands, OutputFormat};

#[test]
fn given_cli_definition_when_asserting_then_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn given_query_flags_when_parsing_then_fills_all_criteria() {
    let cli = Cli::try_parse_from([
        "srview", "query", "report.json", "--text", "lung", "--type", "TEXT", "--rel", "CONTAINS",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Query {
            text,
            value_type,
            relationship,
            ..
        }) => {
            assert_eq!(text.as_deref(), Some("lung"));
            assert_eq!(value_type.as_deref(), Some("TEXT"));
            assert_eq!(relationship.as_deref(), Some("CONTAINS"));
        }
        other => panic!("expected query command, got {:?}", other),
    }
}

#[rstest]
#[case(&["srview", "tree", "r.json"], 0, OutputFormat::Text)]
#[case(&["srview", "-vv", "tree", "r.json"], 2, OutputFormat::Text)]
#[case(&["srview", "tree", "r.json", "--format", "json", "-v"], 1, OutputFormat::Json)]
fn given_global_flags_when_parsing_then_accepted_anywhere(
    #[case] args: &[&str],
    #[case] verbose: u8,
    #[case] format: OutputFormat,
) {
    let cli = Cli::try_parse_from(args).unwrap();
    assert_eq!(cli.verbose, verbose);
    assert_eq!(cli.format, format);
}

#[test]
fn given_config_init_global_when_parsing_then_sets_flag() {
    let cli = Cli::try_parse_from(["srview", "-C", "/tmp", "config", "init", "--global"]).unwrap();
    assert_eq!(cli.config_dir.as_deref(), Some(std::path::Path::new("/tmp")));
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Init { global: true }
        })
    ));
}

#[test]
fn given_search_without_term_when_parsing_then_fails() {
    assert!(Cli::try_parse_from(["srview", "search", "r.json"]).is_err());
}

// ============================================================
// Command execution against the sample report
// ============================================================

mod execution {
    use std::path::Path;
    use std::sync::Arc;

    use clap::Parser;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use srview::application::services::{Report, ReportService};
    use srview::cli::{execute_command, Cli, CliError, Selection};
    use srview::config::local_config_path;
    use srview::domain::TreeBuilder;
    use srview::exitcode;
    use srview::infrastructure::json::JsonDocumentLoader;
    use srview::infrastructure::traits::RealFileSystem;
    use srview::util::testing;

    const SAMPLE: &str = "tests/resources/structured_report.json";

    #[fixture]
    fn report() -> Report {
        testing::init_test_setup();
        let loader = Arc::new(JsonDocumentLoader::new(Arc::new(RealFileSystem)));
        ReportService::new(loader, TreeBuilder::new())
            .open(Path::new(SAMPLE))
            .expect("sample report loads")
    }

    /// Parse `srview -C <isolated dir> <args...>`, away from any local config.
    fn parse(config_dir: &TempDir, args: &[&str]) -> Cli {
        let dir = config_dir.path().to_string_lossy().into_owned();
        let mut argv = vec!["srview", "-C", dir.as_str()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    fn run(args: &[&str]) -> Result<(), CliError> {
        let config_dir = TempDir::new().unwrap();
        execute_command(&parse(&config_dir, args))
    }

    fn selected_ids(report: &Report, args: &[&str]) -> Vec<usize> {
        let config_dir = TempDir::new().unwrap();
        let cli = parse(&config_dir, args);
        let selection = Selection::from_command(cli.command.as_ref().unwrap())
            .expect("listing command");
        selection
            .apply(report)
            .unwrap()
            .iter()
            .map(|n| n.id.0)
            .collect()
    }

    #[rstest]
    #[case(&["find-rel", SAMPLE, " "], vec![])]
    #[case(&["find-rel", SAMPLE, ""], vec![])]
    #[case(&["find-rel", SAMPLE, "contains"], vec![2, 3, 4, 5, 6, 7])]
    #[case(&["find-type", SAMPLE, ""], vec![])]
    #[case(&["find-type", SAMPLE, "num"], vec![7])]
    #[case(&["query", SAMPLE, "--rel", " "], (0..9).collect())]
    #[case(&["query", SAMPLE, "--text", "mass", "--type", "TEXT"], vec![3])]
    fn given_listing_command_when_selecting_then_uses_matching_search(
        report: Report,
        #[case] args: &[&str],
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(selected_ids(&report, args), expected);
    }

    #[rstest]
    fn given_blank_relationship_when_finding_then_nodes_without_relationship_never_match(
        report: Report,
    ) {
        let config_dir = TempDir::new().unwrap();
        let cli = parse(&config_dir, &["find-rel", SAMPLE, "   "]);
        let selection = Selection::from_command(cli.command.as_ref().unwrap()).unwrap();

        let nodes = selection.apply(&report).unwrap();

        assert!(nodes.iter().all(|n| n.relationship.is_some()));
    }

    #[rstest]
    #[case(&["tree", SAMPLE])]
    #[case(&["--format", "json", "tree", SAMPLE])]
    #[case(&["search", SAMPLE, "lung", "--tree"])]
    #[case(&["find-rel", SAMPLE, "CONTAINS"])]
    #[case(&["--format", "json", "find-type", SAMPLE, "TEXT"])]
    #[case(&["query", SAMPLE])]
    #[case(&["show", SAMPLE, "root"])]
    #[case(&["show", SAMPLE, "node_7"])]
    #[case(&["--format", "json", "show", SAMPLE, "5"])]
    #[case(&["scan", "tests/resources/reports"])]
    fn given_valid_command_when_executing_then_succeeds(#[case] args: &[&str]) {
        testing::init_test_setup();
        let result = run(args);
        assert!(result.is_ok(), "{:?} failed: {:?}", args, result.err());
    }

    #[rstest]
    #[case(&["show", SAMPLE, "node_99"], exitcode::USAGE)]
    #[case(&["show", SAMPLE, "nodeX"], exitcode::USAGE)]
    #[case(&["search", SAMPLE, "  "], exitcode::USAGE)]
    #[case(&["tree", "tests/resources/missing.json"], exitcode::NOINPUT)]
    #[case(&["tree", "tests/resources/reports/ct_image.json"], exitcode::DATAERR)]
    #[case(&["tree", "tests/resources/reports/broken.json"], exitcode::DATAERR)]
    #[case(&["scan", "tests/resources/no-such-dir"], exitcode::NOINPUT)]
    fn given_failing_command_when_executing_then_maps_exit_code(
        #[case] args: &[&str],
        #[case] expected: i32,
    ) {
        testing::init_test_setup();
        let err = run(args).expect_err("command should fail");
        assert_eq!(err.exit_code(), expected, "{:?}: {}", args, err);
    }

    #[test]
    fn given_empty_dir_when_config_init_twice_then_creates_once() {
        let config_dir = TempDir::new().unwrap();

        execute_command(&parse(&config_dir, &["config", "init"])).unwrap();
        let written = std::fs::read_to_string(local_config_path(config_dir.path())).unwrap();
        assert!(written.contains("# srview configuration"));

        let again = execute_command(&parse(&config_dir, &["config", "init"])).unwrap_err();
        assert_eq!(again.exit_code(), exitcode::USAGE);
    }

    #[test]
    fn given_local_config_when_config_show_then_succeeds() {
        let config_dir = TempDir::new().unwrap();
        std::fs::write(
            local_config_path(config_dir.path()),
            "root_label = \"Chest CT\"\n",
        )
        .unwrap();

        assert!(execute_command(&parse(&config_dir, &["config", "show"])).is_ok());
    }

    #[rstest]
    fn given_report_tree_when_serializing_then_json_keeps_structure(report: Report) {
        let json = serde_json::to_value(&report.root).unwrap();

        assert_eq!(json["value_type"], "ROOT");
        assert_eq!(json["id"], 0);
        let size = &json["children"][0]["children"][1]["children"][0];
        assert_eq!(size["value_type"], "NUM");
        assert_eq!(size["value"], "Size : 8.2 (112039 DCM)");
        assert_eq!(size["relationship"], "CONTAINS");
        assert_eq!(size["payload"]["kind"], "measurement");
        assert_eq!(size["payload"]["unit"]["scheme"], "UCUM");
        assert!(json.get("relationship").is_none());
    }
}
