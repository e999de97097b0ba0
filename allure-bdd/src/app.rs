use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use console::{style, Term};
use eyre::OptionExt;
use itertools::Itertools;

use crate::{digest, identity, Classifier, Config};

/// Build the CLI with clap's builder pattern
fn build_cli() -> ClapCommand {
    ClapCommand::new("allure-bdd")
        .about("allure-bdd CLI helps tuning tag classification rules and inspecting test identities")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(Arg::new("log")
            .long("log")
            .help("Print allure-bdd's internal logs. The level is taken from RUST_LOG (default \"debug\")")
            .global(true)
            .action(ArgAction::SetTrue))
        .subcommand(
            ClapCommand::new("classify")
                .about("Show the labels and links the configured rules produce for a set of tags")
                .arg(Arg::new("tags")
                    .short('t')
                    .long("tags")
                    .help("Scenario tags in comma-separated string. e.g. --tags smoke,owner:alice")
                    .value_delimiter(',')
                    .action(ArgAction::Append))
                .arg(Arg::new("feature-tags")
                    .short('f')
                    .long("feature-tags")
                    .help("Feature tags in comma-separated string. e.g. --feature-tags epic:Checkout")
                    .value_delimiter(',')
                    .action(ArgAction::Append))
        )
        .subcommand(
            ClapCommand::new("history-id")
                .about("Compute the history id of a scenario")
                .arg(Arg::new("title")
                    .long("title")
                    .help("Scenario title")
                    .required(true))
                .arg(Arg::new("arg")
                    .short('a')
                    .long("arg")
                    .help("Scenario argument as key=value, in binding order. e.g. --arg user=alice --arg amount=42")
                    .action(ArgAction::Append))
        )
        .subcommand(
            ClapCommand::new("config")
                .about("Print the loaded configuration")
        )
}

/// allure-bdd CLI.
#[derive(Default)]
pub struct App {
    config: Option<Config>,
}

impl App {
    pub fn new() -> App {
        App { config: None }
    }

    /// Use `config` instead of the process-wide configuration.
    pub fn with_config(config: Config) -> App {
        App {
            config: Some(config),
        }
    }

    /// Parse command-line args and run allure-bdd CLI sub command.
    pub fn run(self) -> eyre::Result<()> {
        let matches = build_cli().get_matches();
        color_eyre::install()?;
        self.dispatch(&matches)
    }

    fn dispatch(self, matches: &ArgMatches) -> eyre::Result<()> {
        if matches.get_flag("log") {
            let filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }

        let cfg = self.config.unwrap_or_else(|| crate::get_config().clone());
        tracing::debug!("results directory: {}", cfg.allure.results_directory());
        let term = Term::stdout();

        let lines = match matches.subcommand() {
            Some(("classify", classify_matches)) => {
                let tags = strings(classify_matches, "tags");
                let feature_tags = strings(classify_matches, "feature-tags");
                classify_lines(&cfg, &feature_tags, &tags)
            }
            Some(("history-id", history_matches)) => {
                let title = history_matches
                    .get_one::<String>("title")
                    .ok_or_eyre("--title is required")?;
                let args = strings(history_matches, "arg");
                vec![history_id(title, &args)?]
            }
            Some(("config", _)) => vec![serde_json::to_string_pretty(&cfg)?],
            _ => unreachable!("Subcommand required is set to true"),
        };

        for line in lines {
            term.write_line(&line)?;
        }
        Ok(())
    }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|vals| vals.cloned().collect::<Vec<_>>())
        .unwrap_or_default()
}

/// One line per label and link, in classification order.
fn classify_lines(cfg: &Config, feature_tags: &[String], tags: &[String]) -> Vec<String> {
    let classified = Classifier::new(&cfg.bdd).classify(feature_tags, tags);

    let labels = classified
        .labels
        .iter()
        .map(|label| format!("{} {}={}", style("label").cyan(), label.name, label.value));
    let links = classified.links.iter().map(|link| {
        let kind = link
            .link_type
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "link".to_string());
        format!("{} {kind} {} ({})", style("link").magenta(), link.name, link.url)
    });

    labels.chain(links).collect()
}

/// History id for `title` with `key=value` arguments.
fn history_id(title: &str, args: &[String]) -> eyre::Result<String> {
    let arguments = args
        .iter()
        .map(|arg| {
            arg.split_once('=')
                .ok_or_else(|| eyre::eyre!("argument \"{arg}\" is not in key=value form"))
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    let digest = digest(arguments);
    let parameters = digest
        .parameters
        .iter()
        .map(|p| format!("{}={}", p.name, p.value))
        .join(", ");
    let history_id = identity::history_id(title, &digest.hash);

    if parameters.is_empty() {
        Ok(history_id)
    } else {
        Ok(format!("{history_id} ({parameters})"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn config() -> Config {
        Config::from_json(
            r#"{"bdd": {
                "links": { "issue": "JIRA-\\d+" },
                "grouping": { "suites": { "suite": "^suite:(.+)" } },
                "labels": { "label": "^(\\w+):(.+)" }
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn classify_prints_labels_then_links() {
        console::set_colors_enabled(false);
        let lines = classify_lines(
            &config(),
            &["suite:Payments".to_string()],
            &["JIRA-7".to_string(), "layer:web".to_string(), "smoke".to_string()],
        );
        assert_eq!(
            lines,
            vec![
                "label layer=web",
                "label tag=smoke",
                "label suite=Payments",
                "link issue JIRA-7 (JIRA-7)",
            ]
        );
    }

    #[test_case(&[] => "Pay".to_string(); "no arguments")]
    #[test_case(&["user=alice"] => "Pay493039951 (user=alice)".to_string(); "one argument")]
    fn history_id_line(args: &[&str]) -> String {
        let args = args.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        history_id("Pay", &args).unwrap()
    }

    #[test]
    fn history_id_rejects_malformed_argument() {
        let err = history_id("Pay", &["user".to_string()]).unwrap_err();
        assert!(err.to_string().contains("key=value"), "{err}");
    }

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn classify_arguments_split_on_commas() {
        let matches = build_cli()
            .try_get_matches_from(["allure-bdd", "classify", "--tags", "a,b", "-t", "c"])
            .unwrap();
        let (_, classify_matches) = matches.subcommand().unwrap();
        assert_eq!(strings(classify_matches, "tags"), vec!["a", "b", "c"]);
        assert!(strings(classify_matches, "feature-tags").is_empty());
    }
}
