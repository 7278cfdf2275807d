use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use keytab::{
    prefix_progname_to_error_if_needed, Context, Describe, Enctype, Keytab, KeytabEntry, StrConv,
};
use once_cell::sync::Lazy;
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::Level;

const PROGNAME: &str = "keytab";

static ARGS: Lazy<Args> = Lazy::new(Args::parse);
static NOW: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);
static TIMESTAMP_WIDTH: Lazy<usize> = Lazy::new(|| StrConv::timestamp_to_sfstring(*NOW).len());

#[derive(Parser)]
#[command(name = PROGNAME, version)]
struct Args {
    /// enables debug logging on stderr
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// prints every field of every keytab entry
    Describe(KeytabName),
    /// lists keytab entries
    List(ListArgs),
}

#[derive(ClapArgs)]
struct KeytabName {
    /// uses default client keytab if no name given
    #[arg(short = 'i', default_value_t = false)]
    use_client_keytab: bool,

    name: Option<String>,
}

#[derive(ClapArgs)]
struct ListArgs {
    /// shows keytab entry timestamps
    #[arg(short = 't', default_value_t = false)]
    show_time: bool,
    /// shows the encryption type
    #[arg(short = 'e', default_value_t = false)]
    show_etype: bool,
    /// shows keytab entry keys
    #[arg(short = 'K', default_value_t = false)]
    show_keys: bool,

    #[command(flatten)]
    keytab: KeytabName,
}

fn main() -> ExitCode {
    prefix_progname_to_error_if_needed(PROGNAME, run())
}

fn run() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if ARGS.debug {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &ARGS.command {
        Command::Describe(name) => do_describe(name),
        Command::List(args) => do_list(args),
    }
}

fn resolve(args: &KeytabName) -> anyhow::Result<PathBuf> {
    let name = match &args.name {
        Some(name) => name.to_owned(),
        None => {
            let context =
                Context::init().map_err(|e| anyhow::anyhow!("{} while initializing krb5", e))?;
            if args.use_client_keytab {
                Keytab::client_default_name(&context)
                    .map_err(|e| anyhow::anyhow!("{} while getting default client keytab", e))?
            } else {
                Keytab::default_name(&context)
                    .map_err(|e| anyhow::anyhow!("{} while getting default keytab", e))?
            }
        }
    };
    Keytab::resolve_path(&name).map_err(|e| anyhow::anyhow!("{} while resolving keytab {}", e, name))
}

fn load(path: &Path) -> anyhow::Result<Keytab> {
    Keytab::load(path).map_err(|e| anyhow::anyhow!("{:#} while scanning keytab", e))
}

fn do_describe(args: &KeytabName) -> anyhow::Result<()> {
    let path = resolve(args)?;
    let keytab = load(&path)?;
    print!("{}", keytab.describe(0));
    Ok(())
}

fn do_list(args: &ListArgs) -> anyhow::Result<()> {
    let path = resolve(&args.keytab)?;
    let keytab = load(&path)?;

    println!("Keytab name: FILE:{}", path.display());

    if args.show_time {
        println!(
            "KVNO Timestamp{} Principal",
            " ".repeat(*TIMESTAMP_WIDTH - "Timestamp".len())
        );
        println!(
            "{} {} {}",
            "-".repeat(4),
            "-".repeat(*TIMESTAMP_WIDTH),
            "-".repeat(73 - *TIMESTAMP_WIDTH)
        );
    } else {
        println!("KVNO Principal");
        println!("{} {}", "-".repeat(4), "-".repeat(74));
    }

    for entry in &keytab.entries {
        println!("{}", list_line(args, entry));
    }

    Ok(())
}

fn list_line(args: &ListArgs, entry: &KeytabEntry) -> String {
    let mut line = format!("{:>4} ", entry.kvno());
    if args.show_time {
        match StrConv::keytab_timestamp(entry.timestamp) {
            Some(timestamp) => line.push_str(&StrConv::timestamp_to_sfstring(timestamp)),
            None => line.push_str(&entry.timestamp.to_string()),
        }
        line.push(' ');
    }
    line.push_str(&entry.principal.unparse_name());
    if args.show_etype {
        line.push_str(&format!(" ({}) ", etype_string(entry.key.enctype)));
    }
    if args.show_keys {
        line.push_str(&format!(" (0x{})", hex::encode(entry.key.contents.as_bytes())));
    }
    line
}

fn etype_string(enctype: Enctype) -> String {
    match enctype.deprecated_name(false) {
        Ok(name) => name,
        Err(_) => enctype.to_string(),
    }
}
