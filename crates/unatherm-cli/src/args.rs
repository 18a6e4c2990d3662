//! Command-line parsing.

use std::path::PathBuf;

pub const USAGE: &str = "\
unatherm: thermodynamic enrichment for grouped sequence tables

Usage: unatherm <command> [options]

Commands:
  enrich <table.csv>            Fetch ΔG, ΔH, ΔS and Tm for every row, saving after each row
      --config <file.json>      Pipeline configuration (default: unatherm.json if present)
      --resume                  Keep rows that already have complete results
      --save-raw                Archive each results row under the artifact directory
      --delimiter <char>        Field delimiter (default ',')
  names <table.csv>             Print effective IDs, group positions and artifact names
      --delimiter <char>
  lookup <query> <table.csv>... Find the first row whose Entry ID or Sequence matches
      --fetch-structure <dir>   Download the matched entry's PDB file into <dir>
      --delimiter <char>
  help                          Show this help message

Environment:
  RUST_LOG                      Log filter (default: info)
  UNATHERM_URL                  Melting form URL
  UNATHERM_ROW_TIMEOUT_SECS     Per-row timeout
  UNATHERM_ENERGY_MODEL         DNA or RNA
  UNATHERM_ARTIFACT_DIR         Directory for per-row artifacts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enrich {
        input: PathBuf,
        config: Option<PathBuf>,
        resume: bool,
        save_raw: bool,
        delimiter: Option<char>,
    },
    Names {
        input: PathBuf,
        delimiter: Option<char>,
    },
    Lookup {
        query: String,
        inputs: Vec<PathBuf>,
        fetch_structure: Option<PathBuf>,
        delimiter: Option<char>,
    },
    Help,
}

fn parse_delimiter(value: &str) -> Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ if value == "\\t" => Ok('\t'),
        _ => Err(format!("delimiter must be a single ASCII character, got '{}'", value)),
    }
}

/// Parse arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };

    let mut positional: Vec<String> = Vec::new();
    let mut config = None;
    let mut resume = false;
    let mut save_raw = false;
    let mut delimiter = None;
    let mut fetch_structure = None;

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        let mut value = |flag: &str| {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{} requires a value", flag))
        };
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--resume" => resume = true,
            "--save-raw" => save_raw = true,
            "--delimiter" => delimiter = Some(parse_delimiter(&value("--delimiter")?)?),
            "--fetch-structure" => {
                fetch_structure = Some(PathBuf::from(value("--fetch-structure")?))
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            _ => positional.push(arg.clone()),
        }
    }

    match command.as_str() {
        "enrich" => match positional.as_slice() {
            [input] => Ok(Command::Enrich {
                input: PathBuf::from(input),
                config,
                resume,
                save_raw,
                delimiter,
            }),
            _ => Err("Usage: unatherm enrich <table.csv> [options]".into()),
        },
        "names" => match positional.as_slice() {
            [input] => Ok(Command::Names {
                input: PathBuf::from(input),
                delimiter,
            }),
            _ => Err("Usage: unatherm names <table.csv>".into()),
        },
        "lookup" => match positional.split_first() {
            Some((query, inputs)) if !inputs.is_empty() => Ok(Command::Lookup {
                query: query.clone(),
                inputs: inputs.iter().map(PathBuf::from).collect(),
                fetch_structure,
                delimiter,
            }),
            _ => Err("Usage: unatherm lookup <query> <table.csv>...".into()),
        },
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!(
            "Unknown command: {}. Use 'unatherm help' for usage.",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_enrich_with_flags() {
        let cmd = parse_args(&args(&[
            "enrich", "dna.csv", "--resume", "--config", "run.json", "--delimiter", ";",
        ]))
        .unwrap();
        assert_eq!(
            cmd,
            Command::Enrich {
                input: PathBuf::from("dna.csv"),
                config: Some(PathBuf::from("run.json")),
                resume: true,
                save_raw: false,
                delimiter: Some(';'),
            }
        );
    }

    #[test]
    fn test_lookup_multiple_tables() {
        let cmd = parse_args(&args(&[
            "lookup", "1BNA", "a.csv", "b.csv", "--fetch-structure", "pdb",
        ]))
        .unwrap();
        match cmd {
            Command::Lookup {
                query,
                inputs,
                fetch_structure,
                ..
            } => {
                assert_eq!(query, "1BNA");
                assert_eq!(inputs.len(), 2);
                assert_eq!(fetch_structure, Some(PathBuf::from("pdb")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        assert!(parse_args(&args(&["enrich"])).is_err());
        assert!(parse_args(&args(&["lookup", "1BNA"])).is_err());
        assert!(parse_args(&args(&["names", "a.csv", "--bogus"])).is_err());
        assert!(parse_args(&args(&["enrich", "a.csv", "--config"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["names", "a.csv", "--delimiter", ",,"])).is_err());
    }

    #[test]
    fn test_tab_delimiter() {
        let cmd = parse_args(&args(&["names", "a.tsv", "--delimiter", "\\t"])).unwrap();
        assert_eq!(
            cmd,
            Command::Names {
                input: PathBuf::from("a.tsv"),
                delimiter: Some('\t'),
            }
        );
    }
}
