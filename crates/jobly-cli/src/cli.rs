use jobly::FilterCriteria;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Jobs,
    Companies,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Jobs(GlobalArgs, JobsCommand),
    Companies(GlobalArgs, CompaniesCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub config: PathBuf,
    pub database: Option<String>,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from("jobly.toml"),
            database: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobsCommand {
    List(FilterCriteria),
    Get(i32),
    Create(String),
    Update(i32, String),
    Delete(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompaniesCommand {
    Get(String),
    Create(String),
    Update(String, String),
    Delete(String),
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "jobs" => parse_jobs(it.map(|s| s.as_str())),
        "companies" => parse_companies(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Tokens left after global and command-specific options are consumed.
struct Parsed<'a> {
    global: GlobalArgs,
    positional: Vec<&'a str>,
    criteria: FilterCriteria,
    help: bool,
}

fn parse_tokens<'a>(
    mut it: impl Iterator<Item = &'a str>,
    allow_filters: bool,
) -> anyhow::Result<Parsed<'a>> {
    let mut parsed = Parsed {
        global: GlobalArgs::default(),
        positional: Vec::new(),
        criteria: FilterCriteria::default(),
        help: false,
    };

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => parsed.help = true,
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                parsed.global.config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                parsed.global.config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                parsed.global.database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                parsed.global.database = Some(token.trim_start_matches("--database=").to_string());
            }
            "--min-salary" if allow_filters => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--min-salary requires a value");
                };
                parsed.criteria.min_salary = Some(parse_salary(v)?);
            }
            _ if allow_filters && token.starts_with("--min-salary=") => {
                parsed.criteria.min_salary =
                    Some(parse_salary(token.trim_start_matches("--min-salary="))?);
            }
            "--has-equity" if allow_filters => parsed.criteria.has_equity = Some(true),
            "--title" if allow_filters => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--title requires a value");
                };
                parsed.criteria.title = Some(v.to_string());
            }
            _ if allow_filters && token.starts_with("--title=") => {
                parsed.criteria.title = Some(token.trim_start_matches("--title=").to_string());
            }
            _ if token.starts_with("--") => anyhow::bail!("unknown option: {token}"),
            _ => parsed.positional.push(token),
        }
    }

    Ok(parsed)
}

fn parse_salary(v: &str) -> anyhow::Result<i32> {
    let n: i32 = v
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid --min-salary {v:?}: {e}"))?;
    if n < 0 {
        anyhow::bail!("--min-salary must be >= 0");
    }
    Ok(n)
}

fn parse_id(v: &str) -> anyhow::Result<i32> {
    v.parse()
        .map_err(|e| anyhow::anyhow!("invalid job id {v:?}: {e}"))
}

fn parse_jobs<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let Some(sub) = it.next() else {
        return Ok(Command::Help(HelpTopic::Jobs));
    };
    if matches!(sub, "-h" | "--help") {
        return Ok(Command::Help(HelpTopic::Jobs));
    }

    let parsed = parse_tokens(it, sub == "list")?;
    if parsed.help {
        return Ok(Command::Help(HelpTopic::Jobs));
    }
    let args = parsed.positional.as_slice();

    let cmd = match (sub, args) {
        ("list", []) => JobsCommand::List(parsed.criteria),
        ("get", [id]) => JobsCommand::Get(parse_id(id)?),
        ("create", [json]) => JobsCommand::Create(json.to_string()),
        ("update", [id, json]) => JobsCommand::Update(parse_id(id)?, json.to_string()),
        ("delete", [id]) => JobsCommand::Delete(parse_id(id)?),
        ("list" | "get" | "create" | "update" | "delete", _) => {
            anyhow::bail!("wrong number of arguments for `jobs {sub}`")
        }
        _ => anyhow::bail!("unknown subcommand: jobs {sub}"),
    };
    Ok(Command::Jobs(parsed.global, cmd))
}

fn parse_companies<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let Some(sub) = it.next() else {
        return Ok(Command::Help(HelpTopic::Companies));
    };
    if matches!(sub, "-h" | "--help") {
        return Ok(Command::Help(HelpTopic::Companies));
    }

    let parsed = parse_tokens(it, false)?;
    if parsed.help {
        return Ok(Command::Help(HelpTopic::Companies));
    }
    let args = parsed.positional.as_slice();

    let cmd = match (sub, args) {
        ("get", [handle]) => CompaniesCommand::Get(handle.to_string()),
        ("create", [json]) => CompaniesCommand::Create(json.to_string()),
        ("update", [handle, json]) => {
            CompaniesCommand::Update(handle.to_string(), json.to_string())
        }
        ("delete", [handle]) => CompaniesCommand::Delete(handle.to_string()),
        ("get" | "create" | "update" | "delete", _) => {
            anyhow::bail!("wrong number of arguments for `companies {sub}`")
        }
        _ => anyhow::bail!("unknown subcommand: companies {sub}"),
    };
    Ok(Command::Companies(parsed.global, cmd))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
jobly - manage job listings and companies

USAGE:
  jobly <COMMAND> [OPTIONS]

COMMANDS:
  jobs          List, show, create, update and delete jobs
  companies     Show, create, update and delete companies

GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config

Run `jobly <command> --help` for more."
            );
        }
        HelpTopic::Jobs => {
            println!(
                "\
USAGE:
  jobly jobs list [--min-salary <N>] [--has-equity] [--title <TEXT>]
  jobly jobs get <ID>
  jobly jobs create <JSON>      {{\"title\", \"salary\", \"equity\", \"companyHandle\"}}
  jobly jobs update <ID> <JSON> {{\"title\", \"salary\", \"equity\"}} (any subset)
  jobly jobs delete <ID>"
            );
        }
        HelpTopic::Companies => {
            println!(
                "\
USAGE:
  jobly companies get <HANDLE>
  jobly companies create <JSON>          {{\"handle\", \"name\", \"description\", \"numEmployees\", \"logoUrl\"}}
  jobly companies update <HANDLE> <JSON> {{\"name\", \"description\", \"numEmployees\", \"logoUrl\"}} (any subset)
  jobly companies delete <HANDLE>"
            );
        }
    }
}
