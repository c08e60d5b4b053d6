use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{arg, command, ArgAction, Command};
use device::FileDevice;

use yas::layout::Version;
use yas::logging::init_logs;
use yas::pv::PVConfig;
use yas::{PVManager, StorageValue, Time};

fn cli() -> Command {
    command!()
        .arg(arg!(<path> "Path to the physical volume file"))
        .arg(
            arg!(-v --verbose "Print more debug information, or set `RUST_LOG=debug`")
                .action(ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Creates a new, empty physical volume")
                .arg(arg!(--priority <N> "Volume priority").default_value("0"))
                .arg(arg!(--"cluster-size" <N> "Cluster size in bytes").default_value("4096")),
        )
        .subcommand(
            Command::new("put")
                .about("Stores a value under a key")
                .arg(arg!(<key> "Key"))
                .arg(arg!(<type> "int8/uint8/int16/uint16/int32/uint32/int64/uint64/float/double/string/blob"))
                .arg(arg!(<value> "Value, parsed according to <type>")),
        )
        .subcommand(Command::new("get").about("Reads a value").arg(arg!(<key> "Key")))
        .subcommand(Command::new("delete").about("Removes a key").arg(arg!(<key> "Key")))
        .subcommand(Command::new("has").about("Checks whether a key exists").arg(arg!(<key> "Key")))
        .subcommand(
            Command::new("expire")
                .about("Sets a key's expiration, in epoch seconds")
                .arg(arg!(<key> "Key"))
                .arg(arg!(<seconds> "Epoch seconds")),
        )
        .subcommand(Command::new("get-expire").about("Reads a key's expiration").arg(arg!(<key> "Key")))
}

fn parse_value(ty: &str, raw: &str) -> Result<StorageValue> {
    Ok(match ty {
        "int8" => StorageValue::Int8(raw.parse()?),
        "uint8" => StorageValue::Uint8(raw.parse()?),
        "int16" => StorageValue::Int16(raw.parse()?),
        "uint16" => StorageValue::Uint16(raw.parse()?),
        "int32" => StorageValue::Int32(raw.parse()?),
        "uint32" => StorageValue::Uint32(raw.parse()?),
        "int64" => StorageValue::Int64(raw.parse()?),
        "uint64" => StorageValue::Uint64(raw.parse()?),
        "float" => StorageValue::Float(raw.parse()?),
        "double" => StorageValue::Double(raw.parse()?),
        "string" => StorageValue::String(raw.to_string()),
        "blob" => StorageValue::Blob(raw.as_bytes().to_vec()),
        other => return Err(anyhow!("unknown value type `{other}`")),
    })
}

fn print_value(value: &StorageValue) {
    match value {
        StorageValue::Int8(v) => println!("{v}"),
        StorageValue::Uint8(v) => println!("{v}"),
        StorageValue::Int16(v) => println!("{v}"),
        StorageValue::Uint16(v) => println!("{v}"),
        StorageValue::Int32(v) => println!("{v}"),
        StorageValue::Uint32(v) => println!("{v}"),
        StorageValue::Int64(v) => println!("{v}"),
        StorageValue::Uint64(v) => println!("{v}"),
        StorageValue::Float(v) => println!("{v}"),
        StorageValue::Double(v) => println!("{v}"),
        StorageValue::String(v) => println!("{v}"),
        StorageValue::Blob(v) => println!("{}", String::from_utf8_lossy(v)),
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logs(matches.get_flag("verbose"));

    let path = PathBuf::from(matches.get_one::<String>("path").unwrap());

    if let Some(create_matches) = matches.subcommand_matches("create") {
        let priority: i32 = create_matches.get_one::<String>("priority").unwrap().parse()?;
        let cluster_size: u32 = create_matches.get_one::<String>("cluster-size").unwrap().parse()?;
        let device = FileDevice::create(&path).context("creating physical volume file")?;
        let config = PVConfig { version: Version::new(1, 0), priority, cluster_size };
        let pv = PVManager::create(device, config)?;
        pv.close()?;
        println!("created {}", path.display());
        return Ok(());
    }

    let device = FileDevice::open(&path).context("opening physical volume file")?;
    let mut pv = PVManager::load(device)?;

    match matches.subcommand() {
        Some(("put", m)) => {
            let key = m.get_one::<String>("key").unwrap();
            let ty = m.get_one::<String>("type").unwrap();
            let raw = m.get_one::<String>("value").unwrap();
            let value = parse_value(ty, raw)?;
            pv.put(key, value)?;
        }
        Some(("get", m)) => {
            let key = m.get_one::<String>("key").unwrap();
            print_value(&pv.get(key)?);
        }
        Some(("delete", m)) => {
            let key = m.get_one::<String>("key").unwrap();
            pv.delete(key)?;
        }
        Some(("has", m)) => {
            let key = m.get_one::<String>("key").unwrap();
            println!("{}", pv.has_key(key));
        }
        Some(("expire", m)) => {
            let key = m.get_one::<String>("key").unwrap();
            let seconds: u64 = m.get_one::<String>("seconds").unwrap().parse()?;
            pv.set_expired_date(key, Time::from_seconds(seconds))?;
        }
        Some(("get-expire", m)) => {
            let key = m.get_one::<String>("key").unwrap();
            println!("{}", pv.get_expired_date(key)?.seconds());
        }
        _ => unreachable!("subcommand_required guarantees a match"),
    }

    pv.close()?;
    Ok(())
}
