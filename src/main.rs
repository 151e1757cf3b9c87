use std::env;

use dat2csv::{
    analyze_dat, convert_dat_to_csv, parse_delimiter, AppConfig, BoundaryStrategy,
    ConversionOptions,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "\
Usage:
  dat2csv <input.dat> <output.csv> [options]
  dat2csv --probe <input.dat> [--delimiter <char>]

Options:
  --strategy <name>     count-based | width-inferred | terminator-suffix
  --delimiter <char>    field delimiter (default: ¸)
  --columns <n>         expected column count (required for count-based)
  --config <path>       TOML config file (default: dat2csv.toml if present)
";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("dat2csv=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("--probe") {
        return run_probe(&args[1..]);
    }

    let mut positional = Vec::new();
    let mut strategy = None;
    let mut delimiter = None;
    let mut columns = None;
    let mut config_path = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--strategy" => strategy = Some(flag_value(&mut iter, "--strategy")?),
            "--delimiter" => delimiter = Some(flag_value(&mut iter, "--delimiter")?),
            "--columns" => columns = Some(flag_value(&mut iter, "--columns")?),
            "--config" => config_path = Some(flag_value(&mut iter, "--config")?),
            "--help" | "-h" => {
                print!("{USAGE}");
                return Ok(());
            }
            other if other.starts_with("--") => {
                anyhow::bail!("unknown flag {other:?}\n{USAGE}");
            }
            other => positional.push(other.to_string()),
        }
    }

    let [input, output] = positional.as_slice() else {
        anyhow::bail!("expected <input.dat> and <output.csv>\n{USAGE}");
    };

    // A config file named on the command line must load; only the implicit
    // default location may be absent.
    let config = match config_path.as_deref() {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(Some("dat2csv.toml")),
    };

    let mut options = ConversionOptions {
        delimiter: config.conversion.delimiter,
        strategy: config.conversion.strategy,
        expected_columns: config.conversion.expected_columns,
    };
    if let Some(s) = strategy {
        options.strategy = s.parse::<BoundaryStrategy>()?;
    }
    if let Some(d) = delimiter {
        options.delimiter = parse_delimiter(&d)?;
    }
    if let Some(n) = columns {
        options.expected_columns = Some(n.parse::<usize>()?);
    }

    let report = convert_dat_to_csv(input, output, &options)?;
    tracing::info!(
        "Wrote {} ({} records, {} arity mismatches)",
        output,
        report.records_written,
        report.arity_mismatches
    );
    Ok(())
}

fn run_probe(args: &[String]) -> anyhow::Result<()> {
    let mut input = None;
    let mut delimiter = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--delimiter" => delimiter = Some(flag_value(&mut iter, "--delimiter")?),
            other if other.starts_with("--") => {
                anyhow::bail!("unknown flag {other:?}\n{USAGE}");
            }
            other => input = Some(other.to_string()),
        }
    }

    let Some(input) = input else {
        anyhow::bail!("--probe requires an input path\n{USAGE}");
    };

    let config = AppConfig::load_or_default(Some("dat2csv.toml"));
    let delimiter = match delimiter {
        Some(d) => parse_delimiter(&d)?,
        None => config.conversion.delimiter,
    };

    let metadata = analyze_dat(&input, delimiter, config.conversion.probe_sample_lines)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

fn flag_value<'a, I>(iter: &mut I, flag: &str) -> anyhow::Result<String>
where
    I: Iterator<Item = &'a String>,
{
    iter.next()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value\n{USAGE}"))
}
